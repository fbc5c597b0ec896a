//! Asset loading off the frame loop
//!
//! Every [`IssuedLoad`] handed out by the session is started here. Results
//! come back through a channel that the frame loop drains once per frame, so
//! loads finish in any order relative to each other and to later commits.

#[cfg(not(target_arch = "wasm32"))]
mod native;
#[cfg(target_arch = "wasm32")]
mod web;

use crossbeam_channel::{Receiver, Sender};

use prism_core::{AssetCatalog, AssetError, CompletedLoad, IssuedLoad, LoadJob, LoadPayload};

/// Starts loads and collects their results
pub struct Loader {
    sender: Sender<CompletedLoad>,
    receiver: Receiver<CompletedLoad>,
    catalog: AssetCatalog,
}

impl Loader {
    /// Create a loader resolving built-in assets through `catalog`
    pub fn new(catalog: AssetCatalog) -> Self {
        let (sender, receiver) = crossbeam_channel::unbounded();
        Self {
            sender,
            receiver,
            catalog,
        }
    }

    /// Start a load
    ///
    /// File dialogs are opened right away; reading and decoding happen in
    /// the background.
    pub fn start(&self, load: IssuedLoad) {
        tracing::debug!("Starting load {:?}", load.job);
        #[cfg(not(target_arch = "wasm32"))]
        native::start(load, &self.catalog, self.sender.clone());
        #[cfg(target_arch = "wasm32")]
        web::start(load, &self.catalog, self.sender.clone());
    }

    /// Results that arrived since the last call
    pub fn drain(&self) -> Vec<CompletedLoad> {
        self.receiver.try_iter().collect()
    }
}

/// Payload reporting that `job` failed with `error`
pub(crate) fn failed(job: &LoadJob, error: AssetError) -> LoadPayload {
    match job {
        LoadJob::Image(key) => LoadPayload::Image {
            key: key.clone(),
            result: Err(error),
        },
        LoadJob::CubeMap(key) => LoadPayload::CubeMap {
            key: key.clone(),
            result: Err(error),
        },
        LoadJob::Font(key) => LoadPayload::Font {
            key: key.clone(),
            result: Err(error),
        },
        LoadJob::PickImage => LoadPayload::PickedImage(Some(Err(error))),
        LoadJob::PickModel => LoadPayload::PickedModel(Some(Err(error))),
    }
}

/// Send a finished load, logging if the frame loop is gone
pub(crate) fn send(sender: &Sender<CompletedLoad>, load: CompletedLoad) {
    if sender.send(load).is_err() {
        tracing::debug!("Load finished after the loader was dropped");
    }
}

#[cfg(test)]
mod tests {
    use prism_core::AssetKey;

    use super::*;

    #[test]
    fn test_failed_keeps_asset_key() {
        let key = AssetKey::Image("textures/shells.jpg".to_string());
        let payload = failed(&LoadJob::Image(key.clone()), AssetError::Io("gone".to_string()));
        assert!(matches!(
            payload,
            LoadPayload::Image { key: k, result: Err(AssetError::Io(_)) } if k == key
        ));

        let payload = failed(&LoadJob::PickModel, AssetError::Io("gone".to_string()));
        assert!(matches!(payload, LoadPayload::PickedModel(Some(Err(_)))));
    }

    #[test]
    fn test_drain_returns_sent_loads() {
        let loader = Loader::new(AssetCatalog::default());
        assert!(loader.drain().is_empty());

        send(
            &loader.sender,
            CompletedLoad {
                ticket: None,
                payload: LoadPayload::PickedImage(None),
            },
        );
        let loads = loader.drain();
        assert_eq!(loads.len(), 1);
        assert!(matches!(loads[0].payload, LoadPayload::PickedImage(None)));
        assert!(loader.drain().is_empty());
    }
}
