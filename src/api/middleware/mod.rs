pub mod admin_page;
pub mod request_id;
pub mod write_gate;

pub use admin_page::AdminPageGuard;
pub use request_id::RequestIdMiddleware;
pub use write_gate::WriteGate;
