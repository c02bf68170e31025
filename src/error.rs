use serde::Serialize;

#[derive(Debug, thiserror::Error)]
#[allow(dead_code)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Cotización no encontrada: {0}")]
    RecordNotFound(String),

    #[error("Datos inválidos: {0}")]
    InvalidData(String),

    #[error("No se pudo generar el PDF: {0}")]
    RenderFailed(String),

    #[error("Error de correo: {0}")]
    EmailFailed(String),

    #[error("Consulta RUC fallida: {0}")]
    LookupFailed(String),
}

impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

// Implement for frontend error handling
pub type Result<T> = std::result::Result<T, String>;
