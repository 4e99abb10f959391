pub mod sqlite_appointment_repo;
pub mod sqlite_schedule_repo;
pub mod sqlite_tenant_repo;

pub mod postgres_appointment_repo;
pub mod postgres_schedule_repo;
pub mod postgres_tenant_repo;
