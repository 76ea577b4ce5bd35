// Rocket's FromForm derive triggers this lint in generated code.
#![allow(clippy::unnecessary_lazy_evaluations)]

use std::path::{Path, PathBuf};

use howl_core::PipelineError;
use rocket::fs::TempFile;
use rocket::http::Status;
use rocket::tokio::task::spawn_blocking;
use rocket::{form::Form, get, post, FromForm, State};
use rocket_dyn_templates::{context, Template};

use crate::images::find_illustration;
use crate::AppState;

fn upload_form() -> Template {
    Template::render("index", context! { prediction: false })
}

#[get("/")]
pub fn show_form() -> Template {
    upload_form()
}

#[derive(Debug, FromForm)]
pub struct UploadForm<'f> {
    audio: Option<TempFile<'f>>,
}

#[post("/", data = "<data>")]
pub async fn upload(
    state: &State<AppState>,
    data: Form<UploadForm<'_>>,
) -> Result<Template, Status> {
    let Some(mut file) = data.into_inner().audio else {
        return Ok(upload_form());
    };

    let Some(name) = upload_name(&file) else {
        return Ok(upload_form());
    };

    let path = reserve_upload_path(&state.upload_dir, &name).map_err(|e| {
        log::error!("Failed to reserve an upload path in {:?}: {}", state.upload_dir, e);
        Status::InternalServerError
    })?;
    file.move_copy_to(&path).await.map_err(|e| {
        log::error!("Failed to store upload {:?}: {}", path, e);
        Status::InternalServerError
    })?;

    let pipeline = state.pipeline.clone();
    let classify_path = path.clone();
    let result = spawn_blocking(move || pipeline.classify_file(&classify_path))
        .await
        .map_err(|e| {
            log::error!("Classification task failed: {}", e);
            Status::InternalServerError
        })?;

    match result {
        Ok(c) => {
            let image_url = c
                .animal
                .and_then(|animal| find_illustration(&state.images_dir, animal));
            Ok(Template::render(
                "index",
                context! {
                    prediction: true,
                    animal: c.label,
                    confidence: c.confidence,
                    is_safe: c.is_safe,
                    image_url,
                },
            ))
        }
        Err(PipelineError::Features(e)) => {
            log::warn!("Cannot process {:?}: {}", path, e);
            Ok(upload_form())
        }
        Err(PipelineError::Classifier(e)) => {
            log::error!("Classifier failed on {:?}: {}", path, e);
            Err(Status::InternalServerError)
        }
    }
}

/// Sanitized client file name split into stem and extension
#[derive(Debug, PartialEq, Eq)]
struct UploadName {
    stem: String,
    extension: Option<String>,
}

/// `None` when the client sent no file name.
fn upload_name(file: &TempFile<'_>) -> Option<UploadName> {
    let raw = file.raw_name()?.dangerous_unsafe_unsanitized_raw().as_str();
    if raw.trim().is_empty() {
        return None;
    }

    let stem = file.name().unwrap_or("upload").to_string();
    let extension = Path::new(raw)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.chars().filter(char::is_ascii_alphanumeric).collect::<String>())
        .filter(|e| !e.is_empty())
        .or_else(|| {
            file.content_type()
                .and_then(|ct| ct.extension())
                .map(|e| e.to_string())
        });

    Some(UploadName { stem, extension })
}

/// Create an empty `<stem>-<random>.<ext>` file in `dir` and return its path.
///
/// Concurrent uploads with the same client name never share a path. The
/// extension is kept so the decoder gets a format hint.
fn reserve_upload_path(dir: &Path, name: &UploadName) -> std::io::Result<PathBuf> {
    let prefix = format!("{}-", name.stem);
    let suffix = name
        .extension
        .as_ref()
        .map(|e| format!(".{}", e))
        .unwrap_or_default();
    let (_, path) = tempfile::Builder::new()
        .prefix(&prefix)
        .suffix(&suffix)
        .tempfile_in(dir)?
        .keep()?;
    Ok(path)
}
