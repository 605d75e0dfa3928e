//! Inventory routes: public browsing plus the staff-only management views.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Form,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use std::sync::Arc;

use crate::db::{AccountInfo, NewVehicle};
use crate::web::templates::{
    AddClassificationTemplate, ClassificationTemplate, ManagementTemplate, VehicleDetailTemplate,
    VehicleFormTemplate, VehicleFormValues,
};
use crate::web::{
    flash, redirect, render_not_found, render_server_error, render_template, render_with_status,
    validation,
};
use crate::AppState;

pub async fn classification_view(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path(classification_id): Path<i64>,
) -> Response {
    let Some(classification) = state.inventory.classification_by_id(classification_id).await
    else {
        return render_not_found(&state).await;
    };

    let (jar, notice) = flash::take(jar);
    let template = ClassificationTemplate {
        title: format!("{} vehicles", classification.classification_name),
        nav: state.inventory.classifications().await,
        notice,
        vehicles: state.inventory.vehicles_by_classification(classification_id).await,
    };
    (jar, render_template(template)).into_response()
}

pub async fn detail_view(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    identity: Option<AccountInfo>,
    Path(inv_id): Path<i64>,
) -> Response {
    let Some(vehicle) = state.inventory.vehicle_by_id(inv_id).await else {
        return render_not_found(&state).await;
    };

    let favorited = match &identity {
        Some(info) => state.favorites.exists(info.account_id, inv_id).await,
        None => false,
    };

    let (jar, notice) = flash::take(jar);
    let template = VehicleDetailTemplate {
        title: format!("{} {} {}", vehicle.inv_year, vehicle.inv_make, vehicle.inv_model),
        nav: state.inventory.classifications().await,
        notice,
        vehicle,
        logged_in: identity.is_some(),
        favorited,
    };
    (jar, render_template(template)).into_response()
}

/// Deliberate failure route used to exercise the 500 page.
pub async fn trigger_error(State(state): State<Arc<AppState>>) -> Response {
    tracing::error!("Intentional server error requested");
    render_server_error(&state).await
}

pub async fn management_view(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    let (jar, notice) = flash::take(jar);
    let classifications = state.inventory.classifications().await;
    let template = ManagementTemplate {
        title: "Inventory Management".to_string(),
        nav: classifications.clone(),
        notice,
        classifications,
    };
    (jar, render_template(template)).into_response()
}

pub async fn add_classification_view(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Response {
    let (jar, notice) = flash::take(jar);
    let template = AddClassificationTemplate {
        title: "Add Classification".to_string(),
        nav: state.inventory.classifications().await,
        notice,
        errors: Vec::new(),
        classification_name: String::new(),
    };
    (jar, render_template(template)).into_response()
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct ClassificationForm {
    classification_name: String,
}

pub async fn add_classification_submit(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<ClassificationForm>,
) -> Response {
    let name = form.classification_name.trim().to_string();

    let rerender = |errors: Vec<String>, nav| {
        render_with_status(
            StatusCode::BAD_REQUEST,
            AddClassificationTemplate {
                title: "Add Classification".to_string(),
                nav,
                notice: None,
                errors,
                classification_name: form.classification_name.clone(),
            },
        )
    };

    if let Err(e) = validation::validate_classification_name(&name) {
        let nav = state.inventory.classifications().await;
        return rerender(vec![e], nav);
    }

    match state.inventory.add_classification(&name).await {
        Ok(_) => {
            let jar = flash::set(jar, &format!("The {} classification was added.", name));
            (jar, redirect("/inv/")).into_response()
        }
        Err(e) if crate::db::is_unique_violation(&e) => {
            let nav = state.inventory.classifications().await;
            rerender(vec!["That classification already exists.".to_string()], nav)
        }
        Err(e) => {
            tracing::error!("Failed to add classification: {}", e);
            render_server_error(&state).await
        }
    }
}

/// Validate vehicle form fields, returning either the typed row values or
/// the full list of messages.
fn check_vehicle_form(form: &VehicleFormValues) -> Result<(i64, i64, f64, i64), Vec<String>> {
    let mut errors = Vec::new();

    let classification_id = match form.classification_id.trim().parse::<i64>() {
        Ok(id) => Some(id),
        Err(_) => {
            errors.push("Please choose a classification.".to_string());
            None
        }
    };
    for check in [
        validation::validate_min_len("Make", &form.inv_make, 3),
        validation::validate_min_len("Model", &form.inv_model, 3),
        validation::validate_min_len("Description", &form.inv_description, 1),
        validation::validate_min_len("Image path", &form.inv_image, 1),
        validation::validate_min_len("Thumbnail path", &form.inv_thumbnail, 1),
        validation::validate_min_len("Color", &form.inv_color, 1),
    ] {
        if let Err(e) = check {
            errors.push(e);
        }
    }
    let year = match validation::parse_year(&form.inv_year) {
        Ok(y) => Some(y),
        Err(e) => {
            errors.push(e);
            None
        }
    };
    let price = match validation::parse_price(&form.inv_price) {
        Ok(p) => Some(p),
        Err(e) => {
            errors.push(e);
            None
        }
    };
    let miles = match validation::parse_miles(&form.inv_miles) {
        Ok(m) => Some(m),
        Err(e) => {
            errors.push(e);
            None
        }
    };

    match (classification_id, year, price, miles) {
        (Some(c), Some(y), Some(p), Some(m)) if errors.is_empty() => Ok((c, y, p, m)),
        _ => Err(errors),
    }
}

async fn vehicle_form_response(
    state: &AppState,
    status: StatusCode,
    title: &str,
    action: String,
    form: VehicleFormValues,
    errors: Vec<String>,
    notice: Option<String>,
) -> Response {
    let template = VehicleFormTemplate {
        title: title.to_string(),
        nav: state.inventory.classifications().await,
        notice,
        errors,
        classifications: state.inventory.classifications().await,
        form,
        action,
    };
    render_with_status(status, template)
}

pub async fn add_vehicle_view(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    let (jar, notice) = flash::take(jar);
    let body = vehicle_form_response(
        &state,
        StatusCode::OK,
        "Add Vehicle",
        "/inv/add-vehicle".to_string(),
        VehicleFormValues::default(),
        Vec::new(),
        notice,
    )
    .await;
    (jar, body).into_response()
}

pub async fn add_vehicle_submit(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<VehicleFormValues>,
) -> Response {
    let (classification_id, year, price, miles) = match check_vehicle_form(&form) {
        Ok(values) => values,
        Err(errors) => {
            return vehicle_form_response(
                &state,
                StatusCode::BAD_REQUEST,
                "Add Vehicle",
                "/inv/add-vehicle".to_string(),
                form,
                errors,
                None,
            )
            .await;
        }
    };

    if state.inventory.classification_by_id(classification_id).await.is_none() {
        return vehicle_form_response(
            &state,
            StatusCode::BAD_REQUEST,
            "Add Vehicle",
            "/inv/add-vehicle".to_string(),
            form,
            vec!["Please choose a classification.".to_string()],
            None,
        )
        .await;
    }

    let created = state
        .inventory
        .add_vehicle(NewVehicle {
            classification_id,
            make: form.inv_make.trim(),
            model: form.inv_model.trim(),
            year,
            description: form.inv_description.trim(),
            image: form.inv_image.trim(),
            thumbnail: form.inv_thumbnail.trim(),
            price,
            miles,
            color: form.inv_color.trim(),
        })
        .await;

    match created {
        Ok(_) => {
            let message = format!(
                "The {} {} was added to inventory.",
                form.inv_make.trim(),
                form.inv_model.trim()
            );
            let jar = flash::set(jar, &message);
            (jar, redirect("/inv/")).into_response()
        }
        Err(e) => {
            tracing::error!("Failed to add vehicle: {}", e);
            render_server_error(&state).await
        }
    }
}

pub async fn edit_vehicle_view(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path(inv_id): Path<i64>,
) -> Response {
    let Some(vehicle) = state.inventory.vehicle_by_id(inv_id).await else {
        return render_not_found(&state).await;
    };

    let (jar, notice) = flash::take(jar);
    let title = format!("Edit {} {}", vehicle.inv_make, vehicle.inv_model);
    let body = vehicle_form_response(
        &state,
        StatusCode::OK,
        &title,
        format!("/inv/edit/{}", inv_id),
        VehicleFormValues::from(vehicle),
        Vec::new(),
        notice,
    )
    .await;
    (jar, body).into_response()
}

pub async fn edit_vehicle_submit(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path(inv_id): Path<i64>,
    Form(form): Form<VehicleFormValues>,
) -> Response {
    if state.inventory.vehicle_by_id(inv_id).await.is_none() {
        return render_not_found(&state).await;
    }

    let (classification_id, year, price, miles) = match check_vehicle_form(&form) {
        Ok(values) => values,
        Err(errors) => {
            return vehicle_form_response(
                &state,
                StatusCode::BAD_REQUEST,
                "Edit Vehicle",
                format!("/inv/edit/{}", inv_id),
                form,
                errors,
                None,
            )
            .await;
        }
    };

    // A stale select value must re-render the form, not trip the
    // foreign key constraint
    if state.inventory.classification_by_id(classification_id).await.is_none() {
        return vehicle_form_response(
            &state,
            StatusCode::BAD_REQUEST,
            "Edit Vehicle",
            format!("/inv/edit/{}", inv_id),
            form,
            vec!["Please choose a classification.".to_string()],
            None,
        )
        .await;
    }

    let updated = state
        .inventory
        .update_vehicle(
            inv_id,
            NewVehicle {
                classification_id,
                make: form.inv_make.trim(),
                model: form.inv_model.trim(),
                year,
                description: form.inv_description.trim(),
                image: form.inv_image.trim(),
                thumbnail: form.inv_thumbnail.trim(),
                price,
                miles,
                color: form.inv_color.trim(),
            },
        )
        .await;

    match updated {
        Ok(true) => {
            let message = format!(
                "The {} {} was updated.",
                form.inv_make.trim(),
                form.inv_model.trim()
            );
            let jar = flash::set(jar, &message);
            (jar, redirect("/inv/")).into_response()
        }
        Ok(false) => render_not_found(&state).await,
        Err(e) => {
            tracing::error!("Failed to update vehicle: {}", e);
            render_server_error(&state).await
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct DeleteForm {
    inv_id: i64,
}

pub async fn delete_vehicle(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<DeleteForm>,
) -> Response {
    let jar = match state.inventory.delete_vehicle(form.inv_id).await {
        Ok(true) => flash::set(jar, "The vehicle was removed from inventory."),
        Ok(false) => flash::set(jar, "That vehicle could not be found."),
        Err(e) => {
            tracing::error!("Failed to delete vehicle: {}", e);
            flash::set(jar, "Sorry, the delete failed.")
        }
    };
    (jar, redirect("/inv/")).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> VehicleFormValues {
        VehicleFormValues {
            classification_id: "2".into(),
            inv_make: "Aldo".into(),
            inv_model: "Meridian".into(),
            inv_year: "2021".into(),
            inv_description: "One owner.".into(),
            inv_image: "/images/vehicles/m.jpg".into(),
            inv_thumbnail: "/images/vehicles/m-tn.jpg".into(),
            inv_price: "23950".into(),
            inv_miles: "18500".into(),
            inv_color: "Silver".into(),
        }
    }

    #[test]
    fn valid_form_parses() {
        let (class_id, year, price, miles) = check_vehicle_form(&filled()).unwrap();
        assert_eq!(class_id, 2);
        assert_eq!(year, 2021);
        assert_eq!(price, 23950.0);
        assert_eq!(miles, 18500);
    }

    #[test]
    fn invalid_form_collects_every_error() {
        let mut form = filled();
        form.classification_id = "".into();
        form.inv_year = "soon".into();
        form.inv_price = "-1".into();
        let errors = check_vehicle_form(&form).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn blank_form_is_rejected() {
        let form = VehicleFormValues::default();
        assert!(check_vehicle_form(&form).is_err());
    }
}
