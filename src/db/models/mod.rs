mod account;
mod favorite;
mod inventory;

pub use account::*;
pub use favorite::*;
pub use inventory::*;
