//! Thread-backed loads for native builds

use std::path::Path;

use crossbeam_channel::Sender;

use prism_core::model::load_obj;
use prism_core::{
    AssetCatalog, AssetError, CompletedLoad, CubeMapData, ImageData, IssuedLoad, LoadJob,
    LoadPayload, Typeface,
};

use super::{failed, send};

/// Image formats offered by the texture import dialog
const IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "tga"];

pub fn start(load: IssuedLoad, catalog: &AssetCatalog, sender: Sender<CompletedLoad>) {
    let IssuedLoad { job, ticket } = load;

    // Dialogs stay on the UI thread
    let source = match &job {
        LoadJob::PickImage => rfd::FileDialog::new()
            .add_filter("Images", &IMAGE_EXTENSIONS)
            .pick_file(),
        LoadJob::PickModel => rfd::FileDialog::new()
            .add_filter("Wavefront OBJ", &["obj"])
            .pick_file(),
        LoadJob::Image(key) | LoadJob::CubeMap(key) | LoadJob::Font(key) => {
            match catalog.resolve(key) {
                Some(path) => Some(path),
                None => {
                    let error = AssetError::Io(format!("{key} has no file to load"));
                    send(&sender, CompletedLoad {
                        ticket,
                        payload: failed(&job, error),
                    });
                    return;
                }
            }
        }
    };

    let Some(path) = source else {
        let payload = match job {
            LoadJob::PickModel => LoadPayload::PickedModel(None),
            _ => LoadPayload::PickedImage(None),
        };
        send(&sender, CompletedLoad { ticket, payload });
        return;
    };

    let extension = catalog.environment_extension().to_string();
    std::thread::spawn(move || {
        let payload = run(&job, &path, &extension);
        send(&sender, CompletedLoad { ticket, payload });
    });
}

/// Read and decode one job from `path`
fn run(job: &LoadJob, path: &Path, extension: &str) -> LoadPayload {
    match job {
        LoadJob::Image(key) => LoadPayload::Image {
            key: key.clone(),
            result: ImageData::load(path),
        },
        LoadJob::CubeMap(key) => LoadPayload::CubeMap {
            key: key.clone(),
            result: CubeMapData::load(path, extension),
        },
        LoadJob::Font(key) => LoadPayload::Font {
            key: key.clone(),
            result: Typeface::load(path).map_err(AssetError::from),
        },
        LoadJob::PickImage => LoadPayload::PickedImage(Some(
            ImageData::load(path).map(|image| (file_name(path), image)),
        )),
        LoadJob::PickModel => LoadPayload::PickedModel(Some(
            load_obj(path)
                .map(|geometry| (file_name(path), geometry))
                .map_err(AssetError::from),
        )),
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use prism_core::AssetKey;

    use super::*;

    #[test]
    fn test_missing_files_report_errors() {
        let path = Path::new("/nonexistent/prism/asset.png");
        let key = AssetKey::Image("asset.png".to_string());

        let payload = run(&LoadJob::Image(key), path, "png");
        assert!(matches!(
            payload,
            LoadPayload::Image {
                result: Err(AssetError::Io(_)),
                ..
            }
        ));

        let payload = run(&LoadJob::PickModel, Path::new("/nonexistent/model.obj"), "png");
        assert!(matches!(payload, LoadPayload::PickedModel(Some(Err(_)))));
    }

    #[test]
    fn test_imported_key_fails_without_thread() {
        let (sender, receiver) = crossbeam_channel::unbounded();
        let load = IssuedLoad {
            job: LoadJob::Image(AssetKey::imported("brick.png")),
            ticket: None,
        };
        start(load, &AssetCatalog::default(), sender);

        let completed = receiver.try_recv().expect("failure is reported synchronously");
        assert!(matches!(
            completed.payload,
            LoadPayload::Image { result: Err(_), .. }
        ));
    }

    #[test]
    fn test_file_name() {
        assert_eq!(file_name(Path::new("/tmp/models/bunny.obj")), "bunny.obj");
    }
}
