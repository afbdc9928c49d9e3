use perfrating::{Classifier, ClassifierHandle, Dispatcher, FeatureField, ModelLoader, NamedFieldValues, RatingError};
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::thread;

#[derive(Debug)]
struct Versioned(i64);

impl Classifier for Versioned {
    fn expected_arity(&self) -> usize {
        9
    }

    fn predict_class(&self, _features: &[f32]) -> Result<i64, RatingError> {
        Ok(self.0)
    }
}

/// Every open yields a model answering with the next class index.
fn rotating_loader(path: &Path) -> ModelLoader {
    let next = Arc::new(AtomicI64::new(0));
    ModelLoader::with_opener(path, move |_: &Path| {
        let class = next.fetch_add(1, Ordering::SeqCst) % 3;
        Ok(Arc::new(Versioned(class)) as Arc<dyn Classifier>)
    })
}

fn form() -> NamedFieldValues {
    FeatureField::ALL
        .into_iter()
        .fold(NamedFieldValues::new(), |fields, field| fields.with(field, 0))
}

#[test]
fn test_reload_swaps_model() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("model.onnx");
    fs::write(&path, b"stub")?;
    let loader = rotating_loader(&path);

    let mut dispatcher = Dispatcher::new(loader.load()?);
    assert_eq!(dispatcher.submit(&form())?.class_index, 0);
    // Memoized: the same model answers again
    dispatcher.set_handle(loader.load()?);
    assert_eq!(dispatcher.submit(&form())?.class_index, 0);

    dispatcher.set_handle(loader.reload()?);
    assert_eq!(dispatcher.submit(&form())?.class_index, 1);
    assert_eq!(dispatcher.handle().generation(), 2);
    Ok(())
}

#[test]
fn test_missing_artifact_blocks_loading() {
    let dir = tempfile::tempdir().unwrap();
    let loader = ModelLoader::new(dir.path().join("nope").join("model.onnx"));
    let err = loader.load().unwrap_err();
    assert!(matches!(err, RatingError::ArtifactNotFound { .. }));
    assert!(perfrating::user_message(&err).contains("form is unavailable"));
    assert!(!loader.is_loaded());
}

#[test]
fn test_shared_handle_across_threads() -> Result<(), Box<dyn std::error::Error>> {
    let handle = ClassifierHandle::from_classifier(Versioned(2));

    let mut workers = vec![];
    for _ in 0..4 {
        let handle = handle.clone();
        workers.push(thread::spawn(move || {
            let mut dispatcher = Dispatcher::new(handle);
            dispatcher.submit(&form()).map(|report| report.class_index)
        }));
    }

    for worker in workers {
        assert_eq!(worker.join().unwrap()?, 2);
    }
    Ok(())
}

#[test]
fn test_reload_does_not_disturb_readers() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("model.onnx");
    fs::write(&path, b"stub")?;
    let loader = Arc::new(rotating_loader(&path));

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let loader = Arc::clone(&loader);
            thread::spawn(move || -> Result<(), RatingError> {
                for _ in 0..50 {
                    let handle = loader.load()?;
                    let first = handle.classifier_class(&form())?;
                    let second = handle.classifier_class(&form())?;
                    assert_eq!(first, second, "a held handle must not change underneath");
                }
                Ok(())
            })
        })
        .collect();

    for _ in 0..20 {
        loader.reload()?;
    }
    for reader in readers {
        reader.join().unwrap()?;
    }
    Ok(())
}

trait ClassOf {
    fn classifier_class(&self, fields: &NamedFieldValues) -> Result<i64, RatingError>;
}

impl ClassOf for ClassifierHandle {
    fn classifier_class(&self, fields: &NamedFieldValues) -> Result<i64, RatingError> {
        let vector = perfrating::build(fields)?;
        perfrating::validate(&vector, self)?;
        perfrating::predict(self, &vector)
    }
}
