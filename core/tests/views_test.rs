// View-model tests: dataset list, detail page and upload flow

mod common;

use common::{base_time, column, completed, dataset, FakeApi};
use datadash_core::api::{ColumnType, Dataset, DatasetStatus, PreviewRow, UploadFile};
use datadash_core::store::{DatasetState, DatasetStore};
use datadash_core::views::{
    AssumeYes, CatalogQuery, Confirm, DatasetListView, DeleteOutcome, DetailView, ListViewModel,
    PreviewTable, UploadFlow,
};
use datadash_core::DashError;
use serde_json::json;
use std::sync::{Arc, Mutex};

/// Declines every prompt and remembers what it was asked
#[derive(Default)]
struct Decline {
    prompts: Mutex<Vec<String>>,
}

impl Confirm for Decline {
    fn confirm(&self, prompt: &str) -> bool {
        self.prompts.lock().unwrap().push(prompt.to_string());
        false
    }
}

fn list_view(api: Arc<FakeApi>) -> (DatasetListView, DatasetStore) {
    let store = DatasetStore::new(api);
    (DatasetListView::new(store.clone(), Arc::new(AssumeYes)), store)
}

// =============================================================================
// Dataset list
// =============================================================================

mod list {
    use super::*;

    #[tokio::test]
    async fn test_load_renders_rows_and_summary() {
        let api = Arc::new(FakeApi::new());
        api.push_list(Ok(vec![completed(2, "b.csv"), dataset(1, "a.csv")]));
        let (view, _store) = list_view(api);

        match view.load(&CatalogQuery::default()).await {
            ListViewModel::Rows { rows, summary } => {
                let ids: Vec<_> = rows.iter().map(|r| r.id).collect();
                assert_eq!(ids, vec![1, 2]);
                assert_eq!(rows[0].size, "1.00 KB");
                assert_eq!(rows[1].status, DatasetStatus::Completed);
                assert_eq!(summary.datasets, 2);
                assert_eq!(summary.total_rows, 30);
                assert_eq!((summary.processing, summary.completed), (1, 1));
            }
            other => panic!("expected rows, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_render_states() {
        let (view, _store) = list_view(Arc::new(FakeApi::new()));
        let query = CatalogQuery::default();
        let now = base_time();

        let loading = DatasetState {
            loading: true,
            ..DatasetState::default()
        };
        assert_eq!(view.render(&loading, &query, now), ListViewModel::Loading);

        let empty = DatasetState::default();
        assert_eq!(
            view.render(&empty, &query, now),
            ListViewModel::Empty { filtered: false }
        );

        let held = DatasetState {
            datasets: vec![dataset(1, "sales.csv")],
            last_fetch: Some(now),
            ..DatasetState::default()
        };
        let search = CatalogQuery {
            search: "inventory".into(),
            ..CatalogQuery::default()
        };
        assert_eq!(
            view.render(&held, &search, now),
            ListViewModel::Empty { filtered: true }
        );

        match view.render(&held, &query, now) {
            ListViewModel::Rows { rows, .. } => assert_eq!(rows[0].uploaded, "1 hour ago"),
            other => panic!("expected rows, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_failure_then_retry() {
        let api = Arc::new(FakeApi::new());
        api.push_list(Err(DashError::Server {
            status: 503,
            message: Some("Service unavailable".to_string()),
        }));
        api.push_list(Ok(vec![dataset(1, "a.csv")]));
        let (view, _store) = list_view(api);
        let query = CatalogQuery::default();

        assert_eq!(
            view.load(&query).await,
            ListViewModel::Failed {
                message: "Service unavailable".to_string()
            }
        );
        assert!(matches!(view.retry(&query).await, ListViewModel::Rows { .. }));
    }

    #[tokio::test]
    async fn test_declined_delete_keeps_dataset() {
        let api = Arc::new(FakeApi::new());
        let store = DatasetStore::new(api.clone());
        store.add_dataset(dataset(1, "a.csv"));
        let decline = Arc::new(Decline::default());
        let view = DatasetListView::new(store.clone(), decline.clone());

        assert_eq!(view.delete(1).await.unwrap(), DeleteOutcome::Cancelled);
        assert!(api.removed.lock().unwrap().is_empty());
        assert!(store.get_dataset_by_id(1).is_some());
        assert!(decline.prompts.lock().unwrap()[0].contains("a.csv"));
    }

    #[tokio::test]
    async fn test_confirmed_delete_removes_dataset() {
        let api = Arc::new(FakeApi::new());
        let (view, store) = list_view(api.clone());
        store.add_dataset(dataset(1, "a.csv"));
        store.add_dataset(dataset(2, "b.csv"));

        assert_eq!(view.delete(1).await.unwrap(), DeleteOutcome::Deleted);
        assert_eq!(*api.removed.lock().unwrap(), vec![1]);
        assert!(store.get_dataset_by_id(1).is_none());
        assert!(store.get_dataset_by_id(2).is_some());
    }

    #[tokio::test]
    async fn test_failed_delete_keeps_dataset() {
        let api = Arc::new(FakeApi {
            fail_remove: true,
            ..FakeApi::default()
        });
        let (view, store) = list_view(api);
        store.add_dataset(dataset(1, "a.csv"));

        let err = view.delete(1).await.unwrap_err();
        assert_eq!(err.user_message("Failed to delete dataset"), "Failed to delete dataset");
        assert!(store.get_dataset_by_id(1).is_some());
    }

    #[tokio::test]
    async fn test_download_link() {
        let (view, _store) = list_view(Arc::new(FakeApi::new()));
        let link = view.download(4).await.unwrap();
        assert_eq!(link.filename, "dataset-4.csv");
    }
}

// =============================================================================
// Detail page
// =============================================================================

mod detail {
    use super::*;

    fn preview_rows() -> Vec<PreviewRow> {
        serde_json::from_value(json!([
            {"region": "north", "price": 1.5},
            {"region": "south", "price": 2},
            {"region": "east", "price": null}
        ]))
        .unwrap()
    }

    #[tokio::test]
    async fn test_load_fetches_everything_and_updates_store() {
        let fetched = Dataset {
            total_rows: 500,
            ..completed(1, "a.csv")
        };
        let api = Arc::new(FakeApi {
            datasets: Mutex::new(vec![fetched]),
            columns: vec![
                column(0, "region", ColumnType::Text),
                column(1, "price", ColumnType::Numeric),
            ],
            preview: preview_rows(),
            ..FakeApi::default()
        });
        let store = DatasetStore::new(api);
        store.add_dataset(dataset(1, "a.csv"));
        let view = DetailView::new(store.clone(), 2);

        assert_eq!(
            view.placeholder(1).unwrap().status,
            DatasetStatus::Processing
        );

        let detail = view.load(1).await.unwrap();
        assert_eq!(detail.columns.len(), 2);
        assert_eq!(detail.preview.len(), 2);

        let table = PreviewTable::from_rows(&detail.preview);
        assert_eq!(table.headers, vec!["region", "price"]);
        assert_eq!(table.rows[1], vec!["south", "2"]);

        let held = store.get_dataset_by_id(1).unwrap();
        assert_eq!(held.status, DatasetStatus::Completed);
        assert_eq!(held.total_rows, 500);
    }

    #[tokio::test]
    async fn test_missing_dataset() {
        let store = DatasetStore::new(Arc::new(FakeApi::new()));
        let view = DetailView::new(store, 10);

        assert!(view.placeholder(7).is_none());
        let err = view.load(7).await.unwrap_err();
        assert!(matches!(err, DashError::NotFound(_)));
    }
}

// =============================================================================
// Upload
// =============================================================================

mod upload {
    use super::*;

    #[tokio::test]
    async fn test_upload_adds_dataset_first() {
        let store = DatasetStore::new(Arc::new(FakeApi::new()));
        store.add_dataset(dataset(1, "old.csv"));
        let flow = UploadFlow::new(store.clone());

        let progress = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&progress);
        let uploaded = flow
            .submit(UploadFile::from_bytes("new.csv", b"a,b\n1,2\n".to_vec()), move |p| {
                sink.lock().unwrap().push(p)
            })
            .await
            .unwrap();

        assert_eq!(uploaded.name, "new.csv");
        assert_eq!(store.snapshot().datasets[0].id, uploaded.id);
        assert_eq!(*progress.lock().unwrap(), vec![40, 100]);
    }

    #[tokio::test]
    async fn test_new_upload_listed_first_by_default() {
        let api = Arc::new(FakeApi::new());
        api.push_list(Ok(vec![dataset(1, "a.csv"), dataset(2, "b.csv")]));
        let store = DatasetStore::new(api);
        store.fetch_datasets(false).await;

        let uploaded = UploadFlow::new(store.clone())
            .submit(UploadFile::from_bytes("new.csv", b"a,b\n1,2\n".to_vec()), |_| {})
            .await
            .unwrap();

        let view = DatasetListView::new(store, Arc::new(AssumeYes));
        match view.load(&CatalogQuery::default()).await {
            ListViewModel::Rows { rows, .. } => {
                let ids: Vec<_> = rows.iter().map(|r| r.id).collect();
                assert_eq!(ids, vec![uploaded.id, 1, 2]);
            }
            other => panic!("unexpected view model: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_rejected_file_leaves_store_untouched() {
        let store = DatasetStore::new(Arc::new(FakeApi::new()));
        let flow = UploadFlow::new(store.clone());

        let err = flow
            .submit(UploadFile::from_bytes("empty.csv", Vec::new()), |_| {})
            .await
            .unwrap_err();
        assert_eq!(err.user_message("Upload failed"), "File is empty");
        assert!(store.snapshot().datasets.is_empty());
    }
}
