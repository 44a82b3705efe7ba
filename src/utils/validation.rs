use crate::config::Config;
use crate::models::{error::AppError, file::FileUpload};

/// Rejects anything that is not a 24 character hexadecimal ObjectId.
pub fn validate_object_id(id: &str, entity: &str) -> Result<(), AppError> {
    if id.len() == 24 && id.bytes().all(|b| b.is_ascii_hexdigit()) {
        Ok(())
    } else {
        Err(AppError::ValidationError(format!("Invalid {entity} id: '{id}'")))
    }
}

/// Client-side upload checks. The server stays the authority; this only
/// avoids sending requests that are certain to be rejected.
pub fn validate_files(files: &[FileUpload]) -> Result<(), AppError> {
    if files.len() > Config::MAX_FILES {
        return Err(AppError::ValidationError(format!(
            "Maximum {} files allowed",
            Config::MAX_FILES
        )));
    }
    files.iter().try_for_each(validate_file)
}

pub fn validate_file(file: &FileUpload) -> Result<(), AppError> {
    if file.name.trim().is_empty() {
        return Err(AppError::ValidationError("File name is required".to_string()));
    }

    if file.size() > Config::MAX_FILE_SIZE {
        return Err(AppError::ValidationError(format!(
            "File {} exceeds the 10MB limit",
            file.name
        )));
    }

    match file.extension() {
        Some(extension) if Config::ALLOWED_EXTENSIONS.contains(&extension.as_str()) => Ok(()),
        _ => Err(AppError::ValidationError(format!(
            "File type not allowed: {}. Allowed types: {}",
            file.name,
            Config::ALLOWED_EXTENSIONS.join(", ")
        ))),
    }
}
