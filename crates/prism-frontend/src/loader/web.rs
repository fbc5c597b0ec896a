//! Browser loads
//!
//! Built-in assets are fetched relative to the page, so the `assets` folder
//! has to be served next to the wasm bundle. User files come through the
//! async file dialog.

use std::path::Path;

use crossbeam_channel::Sender;
use eframe::wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

use prism_core::model::load_obj_from_bytes;
use prism_core::{
    AssetCatalog, AssetError, CompletedLoad, CubeMapData, ImageData, IssuedLoad, LoadJob,
    LoadPayload, Typeface,
};

use super::{failed, send};

pub fn start(load: IssuedLoad, catalog: &AssetCatalog, sender: Sender<CompletedLoad>) {
    let IssuedLoad { job, ticket } = load;
    let resolved = match &job {
        LoadJob::Image(key) | LoadJob::CubeMap(key) | LoadJob::Font(key) => {
            Some(catalog.resolve(key).ok_or_else(|| {
                AssetError::Io(format!("{key} has no file to load"))
            }))
        }
        LoadJob::PickImage | LoadJob::PickModel => None,
    };
    match (resolved, job) {
        (Some(Err(error)), job) => {
            send(&sender, CompletedLoad {
                ticket,
                payload: failed(&job, error),
            });
        }
        (Some(Ok(path)), job) => {
            let extension = catalog.environment_extension().to_string();
            wasm_bindgen_futures::spawn_local(async move {
                let payload = fetch_job(&job, &path, &extension).await;
                send(&sender, CompletedLoad { ticket, payload });
            });
        }
        (None, LoadJob::PickImage) => {
            wasm_bindgen_futures::spawn_local(async move {
                let picked = rfd::AsyncFileDialog::new()
                    .add_filter("Images", &["png", "jpg", "jpeg", "tga"])
                    .pick_file()
                    .await;
                let payload = match picked {
                    Some(file) => {
                        let name = file.file_name();
                        let data = file.read().await;
                        LoadPayload::PickedImage(Some(
                            ImageData::decode(&data).map(|image| (name, image)),
                        ))
                    }
                    None => LoadPayload::PickedImage(None),
                };
                send(&sender, CompletedLoad { ticket, payload });
            });
        }
        // Only the model picker is left
        (None, _) => {
            wasm_bindgen_futures::spawn_local(async move {
                let picked = rfd::AsyncFileDialog::new()
                    .add_filter("Wavefront OBJ", &["obj"])
                    .pick_file()
                    .await;
                let payload = match picked {
                    Some(file) => {
                        let name = file.file_name();
                        let data = file.read().await;
                        let label = name.rsplit_once('.').map_or(name.as_str(), |(stem, _)| stem);
                        LoadPayload::PickedModel(Some(
                            load_obj_from_bytes(label, &data)
                                .map(|geometry| (name.clone(), geometry))
                                .map_err(AssetError::from),
                        ))
                    }
                    None => LoadPayload::PickedModel(None),
                };
                send(&sender, CompletedLoad { ticket, payload });
            });
        }
    }
}

/// Fetch and decode one built-in asset
async fn fetch_job(job: &LoadJob, path: &Path, extension: &str) -> LoadPayload {
    match job {
        LoadJob::Image(key) => LoadPayload::Image {
            key: key.clone(),
            result: fetch_image(path).await,
        },
        LoadJob::CubeMap(key) => LoadPayload::CubeMap {
            key: key.clone(),
            result: fetch_cube_map(path, extension).await,
        },
        LoadJob::Font(key) => LoadPayload::Font {
            key: key.clone(),
            result: match fetch_bytes(path).await {
                Ok(bytes) => Typeface::from_json(&bytes).map_err(AssetError::from),
                Err(e) => Err(e),
            },
        },
        LoadJob::PickImage | LoadJob::PickModel => failed(
            job,
            AssetError::Unsupported("file pickers are not fetched".to_string()),
        ),
    }
}

async fn fetch_image(path: &Path) -> Result<ImageData, AssetError> {
    let bytes = fetch_bytes(path).await?;
    ImageData::decode(&bytes)
}

async fn fetch_cube_map(folder: &Path, extension: &str) -> Result<CubeMapData, AssetError> {
    let mut faces = Vec::with_capacity(6);
    for face in CubeMapData::face_paths(folder, extension) {
        faces.push(fetch_image(&face).await?);
    }
    CubeMapData::from_faces(faces)
}

/// GET `path` relative to the page
async fn fetch_bytes(path: &Path) -> Result<Vec<u8>, AssetError> {
    let url = path.to_string_lossy().replace('\\', "/");
    let io_error = |what: &str| AssetError::Io(format!("{url}: {what}"));

    let window = web_sys::window().ok_or_else(|| io_error("no window"))?;
    let response = JsFuture::from(window.fetch_with_str(&url))
        .await
        .map_err(|e| io_error(&format!("{e:?}")))?;
    let response: web_sys::Response = response
        .dyn_into()
        .map_err(|_| io_error("fetch did not return a Response"))?;
    if !response.ok() {
        return Err(io_error(&format!("HTTP {}", response.status())));
    }

    let buffer = response
        .array_buffer()
        .map_err(|e| io_error(&format!("{e:?}")))?;
    let buffer = JsFuture::from(buffer)
        .await
        .map_err(|e| io_error(&format!("{e:?}")))?;
    Ok(js_sys::Uint8Array::new(&buffer).to_vec())
}
