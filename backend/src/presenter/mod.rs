//! Presentation layer: turns raw records into ready-to-render views.
//!
//! `views` holds the pure builders (age labels, breed fallbacks, section
//! ordering). `dashboard` owns the live presenter that keeps one pet's
//! dashboard current against the store.

pub mod dashboard;
pub mod views;

pub use dashboard::{DashboardNavigation, DashboardPresenter, DashboardServices};
pub use views::{build_pet_selection, PLACEHOLDER_PET_IMAGE};
