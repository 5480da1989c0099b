use crate::api::{Dataset, UploadFile};
use crate::store::DatasetStore;
use crate::Result;
use tracing::info;

/// Upload page: sends the file and puts the new dataset at the top of the
/// store on success.
pub struct UploadFlow {
    store: DatasetStore,
}

impl UploadFlow {
    pub fn new(store: DatasetStore) -> Self {
        Self { store }
    }

    pub async fn submit(
        &self,
        file: UploadFile,
        on_progress: impl Fn(u8) + Send + Sync + 'static,
    ) -> Result<Dataset> {
        let dataset = self
            .store
            .api()
            .upload(file, Some(Box::new(on_progress)))
            .await?;
        self.store.add_dataset(dataset.clone());
        info!(target: "upload", id = dataset.id, name = %dataset.name, "Added uploaded dataset");
        Ok(dataset)
    }
}
