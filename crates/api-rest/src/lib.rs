//! # API REST
//!
//! REST API implementation for HMS.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS, bearer auth)
//!
//! Uses `api-shared` for the response envelope and identity types; all
//! domain logic lives in `hms-core`.

#![warn(rust_2018_idioms)]

pub mod auth;
pub mod error;
pub mod handlers;
pub mod state;

pub use state::AppState;

use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health,
        handlers::appointments::create_appointment,
        handlers::appointments::get_appointments,
        handlers::appointments::get_appointment,
        handlers::appointments::update_appointment,
        handlers::appointments::delete_appointment,
        handlers::appointments::restore_appointment,
        handlers::appointments::approve_appointment,
        handlers::appointments::reject_appointment,
        handlers::appointments::complete_appointment,
        handlers::appointments::cancel_appointment,
        handlers::dashboard::admin_dashboard,
        handlers::dashboard::doctor_dashboard,
        handlers::doctors::create_doctor,
        handlers::doctors::get_doctors,
        handlers::doctors::get_doctor,
        handlers::doctors::update_doctor,
        handlers::doctors::delete_doctor,
        handlers::patients::create_patient,
        handlers::patients::get_patients,
        handlers::patients::get_patient,
        handlers::patients::delete_patient,
        handlers::specializations::create_specialization,
        handlers::specializations::get_specializations,
        handlers::specializations::get_specialization,
        handlers::specializations::delete_specialization,
        handlers::payments::create_payment,
        handlers::payments::get_payments,
        handlers::payments::get_payment,
        handlers::payments::confirm_payment,
        handlers::payments::delete_payment,
        handlers::records::create_medical_record,
        handlers::records::get_medical_records,
        handlers::records::get_medical_record,
        handlers::records::delete_medical_record,
    ),
    components(schemas(
        api_shared::health::HealthRes,
        api_shared::envelope::PageMeta,
        hms_core::models::Appointment,
        hms_core::models::AppointmentDetail,
        hms_core::models::AppointmentListItem,
        hms_core::models::AppointmentStatus,
        hms_core::models::Doctor,
        hms_core::models::MedicalRecord,
        hms_core::models::Patient,
        hms_core::models::Payment,
        hms_core::models::PaymentMethod,
        hms_core::models::PaymentStatus,
        hms_core::models::Specialization,
        hms_core::scheduler::NewAppointment,
        hms_core::scheduler::AppointmentUpdate,
        hms_core::store::DoctorUpdate,
        hms_core::store::NewDoctor,
        hms_core::store::NewMedicalRecord,
        hms_core::store::NewPatient,
        hms_core::store::NewPayment,
        hms_core::store::NewSpecialization,
        hms_core::listings::DoctorProfile,
        hms_core::listings::MedicalRecordView,
        hms_core::listings::PatientProfile,
        hms_core::listings::PaymentView,
        hms_core::reporting::AdminDashboard,
        hms_core::reporting::AdminTotals,
        hms_core::reporting::DoctorDashboard,
        hms_core::reporting::DoctorTotals,
        hms_core::reporting::LatestAppointment,
        hms_core::reporting::LatestBooking,
        hms_core::reporting::TopDoctor,
        handlers::appointments::RejectAppointmentReq,
    ))
)]
pub struct ApiDoc;

/// Builds the REST router over the given application state.
///
/// Every route except `/health` and the Swagger UI requires a bearer token
/// that the deployment's token table knows.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route(
            "/createappointment",
            post(handlers::appointments::create_appointment),
        )
        .route(
            "/getappointments",
            get(handlers::appointments::get_appointments),
        )
        .route(
            "/getappointments/:id",
            get(handlers::appointments::get_appointment),
        )
        .route(
            "/updateappointment/:id",
            put(handlers::appointments::update_appointment),
        )
        .route(
            "/deleteappointment/:id",
            delete(handlers::appointments::delete_appointment),
        )
        .route(
            "/restoreappointment/:id",
            post(handlers::appointments::restore_appointment),
        )
        .route(
            "/approveappointment/:id",
            post(handlers::appointments::approve_appointment),
        )
        .route(
            "/rejectappointment/:id",
            post(handlers::appointments::reject_appointment),
        )
        .route(
            "/completeappointment/:id",
            post(handlers::appointments::complete_appointment),
        )
        .route(
            "/cancelappointment/:id",
            post(handlers::appointments::cancel_appointment),
        )
        .route("/admindashboard", get(handlers::dashboard::admin_dashboard))
        .route(
            "/doctordashboard",
            get(handlers::dashboard::doctor_dashboard),
        )
        .route("/createdoctor", post(handlers::doctors::create_doctor))
        .route("/getdoctors", get(handlers::doctors::get_doctors))
        .route("/getdoctors/:id", get(handlers::doctors::get_doctor))
        .route("/updatedoctor/:id", put(handlers::doctors::update_doctor))
        .route("/deletedoctor/:id", delete(handlers::doctors::delete_doctor))
        .route("/createpatient", post(handlers::patients::create_patient))
        .route("/getpatients", get(handlers::patients::get_patients))
        .route("/getpatients/:id", get(handlers::patients::get_patient))
        .route(
            "/deletepatient/:id",
            delete(handlers::patients::delete_patient),
        )
        .route(
            "/createspecialization",
            post(handlers::specializations::create_specialization),
        )
        .route(
            "/getspecializations",
            get(handlers::specializations::get_specializations),
        )
        .route(
            "/getspecializations/:id",
            get(handlers::specializations::get_specialization),
        )
        .route(
            "/deletespecialization/:id",
            delete(handlers::specializations::delete_specialization),
        )
        .route("/createpayment", post(handlers::payments::create_payment))
        .route("/getpayments", get(handlers::payments::get_payments))
        .route("/getpayments/:id", get(handlers::payments::get_payment))
        .route(
            "/confirmpayment/:id",
            post(handlers::payments::confirm_payment),
        )
        .route(
            "/deletepayment/:id",
            delete(handlers::payments::delete_payment),
        )
        .route(
            "/createmedicalrecord",
            post(handlers::records::create_medical_record),
        )
        .route(
            "/getmedicalrecords",
            get(handlers::records::get_medical_records),
        )
        .route(
            "/getmedicalrecords/:id",
            get(handlers::records::get_medical_record),
        )
        .route(
            "/deletemedicalrecord/:id",
            delete(handlers::records::delete_medical_record),
        )
        .merge(
            SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}
