//! Multipart tool forms (create and edit).

use axum::extract::Multipart;
use toolcrib_common::{Error, Result};

/// A file field of the form.
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub filename: String,
    pub data: Vec<u8>,
}

/// Fields of the tool form. A text field missing from the request is `None`.
#[derive(Debug, Clone, Default)]
pub struct ToolForm {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub serial_no: Option<String>,
    pub photo: Option<PhotoUpload>,
}

impl ToolForm {
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self> {
        let mut form = ToolForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| Error::invalid_input(format!("Invalid multipart: {}", e)))?
        {
            let name = field.name().unwrap_or("").to_string();
            match name.as_str() {
                "photo" => {
                    let filename = field.file_name().unwrap_or("").to_string();
                    let data = field
                        .bytes()
                        .await
                        .map_err(|e| Error::invalid_input(format!("Invalid file: {}", e)))?;
                    if !filename.is_empty() && !data.is_empty() {
                        form.photo = Some(PhotoUpload {
                            filename,
                            data: data.to_vec(),
                        });
                    }
                }
                "name" | "description" | "category" | "serial_no" => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| Error::invalid_input(format!("Invalid field {}: {}", name, e)))?;
                    let slot = match name.as_str() {
                        "name" => &mut form.name,
                        "description" => &mut form.description,
                        "category" => &mut form.category,
                        _ => &mut form.serial_no,
                    };
                    *slot = Some(text);
                }
                other => tracing::debug!("Ignoring form field {:?}", other),
            }
        }

        Ok(form)
    }
}
