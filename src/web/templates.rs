// Askama template definitions

use askama::Template;
use serde::Deserialize;

use crate::db::{AccountInfo, Classification, FavoriteVehicle, Vehicle};

/// Custom filters for Askama templates
mod filters {
    /// Group an integer with thousands separators
    fn group(n: i64) -> String {
        let digits = n.abs().to_string();
        let mut out = String::new();
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                out.push(',');
            }
            out.push(c);
        }
        if n < 0 {
            format!("-{}", out)
        } else {
            out
        }
    }

    pub fn usd(value: &f64) -> ::askama::Result<String> {
        Ok(format!("${}", group(value.round() as i64)))
    }

    pub fn commas(value: &i64) -> ::askama::Result<String> {
        Ok(group(*value))
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn grouping() {
            assert_eq!(usd(&23950.0).unwrap(), "$23,950");
            assert_eq!(usd(&999.0).unwrap(), "$999");
            assert_eq!(commas(&1234567).unwrap(), "1,234,567");
            assert_eq!(commas(&0).unwrap(), "0");
        }
    }
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct HomeTemplate {
    pub title: String,
    pub nav: Vec<Classification>,
    pub notice: Option<String>,
}

#[derive(Template)]
#[template(path = "account/login.html")]
pub struct LoginTemplate {
    pub title: String,
    pub nav: Vec<Classification>,
    pub notice: Option<String>,
    pub errors: Vec<String>,
    /// Re-filled on a failed attempt; the password never is.
    pub email: String,
}

#[derive(Template)]
#[template(path = "account/register.html")]
pub struct RegisterTemplate {
    pub title: String,
    pub nav: Vec<Classification>,
    pub notice: Option<String>,
    pub errors: Vec<String>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

#[derive(Template)]
#[template(path = "account/account.html")]
pub struct AccountTemplate {
    pub title: String,
    pub nav: Vec<Classification>,
    pub notice: Option<String>,
    pub account: AccountInfo,
    pub staff: bool,
}

#[derive(Template)]
#[template(path = "account/update.html")]
pub struct UpdateAccountTemplate {
    pub title: String,
    pub nav: Vec<Classification>,
    pub notice: Option<String>,
    pub errors: Vec<String>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub account_id: i64,
}

#[derive(Template)]
#[template(path = "account/favorites.html")]
pub struct FavoritesTemplate {
    pub title: String,
    pub nav: Vec<Classification>,
    pub notice: Option<String>,
    pub favorites: Vec<FavoriteVehicle>,
}

#[derive(Template)]
#[template(path = "inventory/classification.html")]
pub struct ClassificationTemplate {
    pub title: String,
    pub nav: Vec<Classification>,
    pub notice: Option<String>,
    pub vehicles: Vec<Vehicle>,
}

#[derive(Template)]
#[template(path = "inventory/detail.html")]
pub struct VehicleDetailTemplate {
    pub title: String,
    pub nav: Vec<Classification>,
    pub notice: Option<String>,
    pub vehicle: Vehicle,
    pub logged_in: bool,
    pub favorited: bool,
}

#[derive(Template)]
#[template(path = "inventory/management.html")]
pub struct ManagementTemplate {
    pub title: String,
    pub nav: Vec<Classification>,
    pub notice: Option<String>,
    pub classifications: Vec<Classification>,
}

#[derive(Template)]
#[template(path = "inventory/add_classification.html")]
pub struct AddClassificationTemplate {
    pub title: String,
    pub nav: Vec<Classification>,
    pub notice: Option<String>,
    pub errors: Vec<String>,
    pub classification_name: String,
}

/// Raw form values for the vehicle add/edit forms, echoed back verbatim
/// when validation fails. Missing fields fall back to the defaults so a
/// partial submission re-renders with errors instead of rejecting.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VehicleFormValues {
    pub classification_id: String,
    pub inv_make: String,
    pub inv_model: String,
    pub inv_year: String,
    pub inv_description: String,
    pub inv_image: String,
    pub inv_thumbnail: String,
    pub inv_price: String,
    pub inv_miles: String,
    pub inv_color: String,
}

impl Default for VehicleFormValues {
    fn default() -> Self {
        Self {
            classification_id: String::new(),
            inv_make: String::new(),
            inv_model: String::new(),
            inv_year: String::new(),
            inv_description: String::new(),
            inv_image: "/images/vehicles/no-image.jpg".to_string(),
            inv_thumbnail: "/images/vehicles/no-image-tn.jpg".to_string(),
            inv_price: String::new(),
            inv_miles: String::new(),
            inv_color: String::new(),
        }
    }
}

impl From<Vehicle> for VehicleFormValues {
    fn from(v: Vehicle) -> Self {
        Self {
            classification_id: v.classification_id.to_string(),
            inv_make: v.inv_make,
            inv_model: v.inv_model,
            inv_year: v.inv_year.to_string(),
            inv_description: v.inv_description,
            inv_image: v.inv_image,
            inv_thumbnail: v.inv_thumbnail,
            inv_price: v.inv_price.to_string(),
            inv_miles: v.inv_miles.to_string(),
            inv_color: v.inv_color,
        }
    }
}

#[derive(Template)]
#[template(path = "inventory/vehicle_form.html")]
pub struct VehicleFormTemplate {
    pub title: String,
    pub nav: Vec<Classification>,
    pub notice: Option<String>,
    pub errors: Vec<String>,
    pub classifications: Vec<Classification>,
    pub form: VehicleFormValues,
    /// Form POST target; one template serves both add and edit
    pub action: String,
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub title: String,
    pub nav: Vec<Classification>,
    pub notice: Option<String>,
    pub message: String,
}
