//! Upload directory management.
//!
//! Tool photos and generated QR codes live side by side in one flat
//! directory that is served read-only under `/uploads/`. In production the
//! directory sits on the persistent disk (`UPLOAD_DIR`).

mod qr;
mod storage;

pub use qr::render_qr_png;
pub use storage::{allowed_photo, sanitize_filename, UploadStore, PUBLIC_PREFIX};
