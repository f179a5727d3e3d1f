mod helpers;

use std::sync::Arc;
use std::time::Duration;

use helpers::{
    collect_run, csv_store, folder_with, harness, harness_with_delay, numbered, FailingStore,
    METADATA_REPLY,
};
use stockmeta_core::{AppError, MediaAsset, Platform};
use stockmeta_storage::{CsvRecordStore, RecordStore};
use stockmeta_worker::{PipelineEvent, PipelineStage};
use tempfile::tempdir;
use tokio::sync::mpsc;

fn stages(events: &[PipelineEvent]) -> Vec<PipelineStage> {
    events
        .iter()
        .filter_map(|e| match e {
            PipelineEvent::Progress { stage, .. } => Some(*stage),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn full_run_produces_and_autosaves_record() {
    let dir = tempdir().unwrap();
    let folder = folder_with(dir.path(), &["beach.png"]);
    let h = harness(dir.path(), csv_store());
    h.vocabulary.upsert("ocean", "Sea (body of water)").await.unwrap();

    let adobe_padding = format!("adobe0, ADOBE3, {}", numbered("extra", 15));
    h.completion.push_vision([
        Ok(METADATA_REPLY.to_string()),
        Ok(numbered("adobe", 40)),
        Ok(adobe_padding),
        Ok("beach, sand, sea".to_string()),
        Ok("Ocean, sunset, people".to_string()),
    ]);
    h.completion.push_text([
        Err(AppError::Network("connection reset".to_string())),
        Ok("plaj, kum, deniz".to_string()),
        Ok("deniz, gün batımı".to_string()),
    ]);

    let asset = MediaAsset::new(folder.join("beach.png")).unwrap();
    let (tx, mut rx) = mpsc::unbounded_channel();
    h.orchestrator
        .spawn_generation(asset.clone(), "golden hour".to_string(), tx)
        .await
        .unwrap();
    let events = collect_run(&mut rx).await;

    assert_eq!(
        stages(&events),
        vec![
            PipelineStage::Preprocessing,
            PipelineStage::SynthesizingText,
            PipelineStage::SynthesizingKeywords(Platform::Adobe),
            PipelineStage::SynthesizingKeywords(Platform::Shutterstock),
            PipelineStage::SynthesizingKeywords(Platform::Istock),
            PipelineStage::Mapping,
            PipelineStage::Translating(Platform::Adobe),
            PipelineStage::Translating(Platform::Shutterstock),
            PipelineStage::Translating(Platform::Istock),
            PipelineStage::Assembling,
            PipelineStage::Saved,
        ]
    );

    let finished_at = events
        .iter()
        .position(|e| matches!(e, PipelineEvent::Finished { .. }))
        .expect("run finished");
    let saved_at = events
        .iter()
        .position(|e| matches!(e, PipelineEvent::Progress { stage: PipelineStage::Saved, .. }))
        .expect("autosave reported");
    assert!(finished_at < saved_at);
    let PipelineEvent::Finished { record } = &events[finished_at] else {
        unreachable!()
    };
    match events.last() {
        Some(PipelineEvent::Autosaved { record: autosaved, saved: true }) => {
            assert_eq!(autosaved, record)
        }
        other => panic!("expected successful autosave, got {:?}", other),
    }
    assert_eq!(record.path, asset.key());
    assert_eq!(record.title.en, "Sunset over a quiet beach");
    assert_eq!(record.description.tr, "Sakin deniz üzerinde sıcak akşam ışığı");

    let adobe = &record.keywords.adobe;
    assert_eq!(adobe.en.len(), 49);
    assert_eq!(adobe.en.terms()[40], "extra0");
    assert_eq!(adobe.en.terms()[48], "extra8");
    // Failed translation keeps the English terms
    assert_eq!(adobe.tr, adobe.en);

    assert_eq!(record.keywords.shutterstock.tr.join(), "plaj, kum, deniz");
    assert_eq!(
        record.keywords.istock.en.join(),
        "Sea (body of water), sunset, people"
    );
    assert_eq!(record.keywords.istock.tr.join(), "deniz, gün batımı, people");

    assert_eq!(h.completion.vision_calls(), 5);
    assert_eq!(h.completion.text_calls(), 3);
    assert!(h.completion.prompts()[0].contains("golden hour"));

    let stored = CsvRecordStore::new().load(&folder).await.unwrap();
    assert_eq!(stored.get(&record.path), Some(record));
}

#[tokio::test]
async fn result_is_delivered_before_delayed_autosave() {
    let dir = tempdir().unwrap();
    let folder = folder_with(dir.path(), &["beach.png"]);
    let h = harness_with_delay(dir.path(), csv_store(), Duration::from_secs(30));
    h.completion.push_vision([
        Ok(METADATA_REPLY.to_string()),
        Ok(numbered("adobe", 49)),
        Ok("beach".to_string()),
        Ok("beach".to_string()),
    ]);
    h.completion
        .push_text([Ok("plaj".to_string()), Ok("plaj".to_string()), Ok("plaj".to_string())]);

    let asset = MediaAsset::new(folder.join("beach.png")).unwrap();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let handle = h.orchestrator.spawn_generation(asset.clone(), String::new(), tx);

    let record = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            match rx.recv().await {
                Some(PipelineEvent::Finished { record }) => return record,
                Some(PipelineEvent::Failed { error, .. }) => panic!("{}", error),
                Some(_) => {}
                None => panic!("channel closed before the result"),
            }
        }
    })
    .await
    .expect("result arrived while the autosave was still pending");

    assert_eq!(record.path, asset.key());
    assert!(!CsvRecordStore::table_path(&folder).exists());
    handle.abort();
}

#[tokio::test]
async fn failure_in_text_stage_leaves_no_table() {
    let dir = tempdir().unwrap();
    let folder = folder_with(dir.path(), &["beach.png"]);
    let h = harness(dir.path(), csv_store());
    h.completion
        .push_vision([Ok("I cannot describe this image.".to_string())]);

    let asset = MediaAsset::new(folder.join("beach.png")).unwrap();
    let (tx, mut rx) = mpsc::unbounded_channel();
    h.orchestrator
        .spawn_generation(asset, String::new(), tx)
        .await
        .unwrap();
    let events = collect_run(&mut rx).await;

    assert_eq!(
        stages(&events),
        vec![
            PipelineStage::Preprocessing,
            PipelineStage::SynthesizingText,
            PipelineStage::Failed,
        ]
    );
    match events.last() {
        Some(PipelineEvent::Failed { error, .. }) => {
            assert_eq!(error.stage, PipelineStage::SynthesizingText);
            assert!(matches!(error.source, AppError::Parse(_)));
        }
        other => panic!("expected failure, got {:?}", other),
    }
    assert_eq!(h.completion.vision_calls(), 1);
    assert!(!CsvRecordStore::table_path(&folder).exists());
}

#[tokio::test]
async fn undecodable_image_fails_in_preprocessing() {
    let dir = tempdir().unwrap();
    let folder = folder_with(dir.path(), &["broken.jpg"]);
    let h = harness(dir.path(), csv_store());

    let asset = MediaAsset::new(folder.join("broken.jpg")).unwrap();
    let (tx, _rx) = mpsc::unbounded_channel();
    let err = h.orchestrator.generate(&asset, "", &tx).await.unwrap_err();

    assert_eq!(err.stage, PipelineStage::Preprocessing);
    assert!(matches!(err.source, AppError::Media(_)));
    assert_eq!(h.completion.vision_calls(), 0);
}

#[tokio::test]
async fn autosave_failure_still_delivers_record() {
    let dir = tempdir().unwrap();
    let folder = folder_with(dir.path(), &["beach.png"]);
    let h = harness(dir.path(), Arc::new(FailingStore));
    h.completion.push_vision([
        Ok(METADATA_REPLY.to_string()),
        Ok(numbered("adobe", 49)),
        Ok("beach".to_string()),
        Ok("beach".to_string()),
    ]);
    h.completion.push_text([
        Ok("plaj".to_string()),
        Ok("plaj".to_string()),
        Ok("plaj".to_string()),
    ]);

    let asset = MediaAsset::new(folder.join("beach.png")).unwrap();
    let (tx, mut rx) = mpsc::unbounded_channel();
    h.orchestrator
        .spawn_generation(asset, String::new(), tx)
        .await
        .unwrap();
    let events = collect_run(&mut rx).await;

    assert!(!stages(&events).contains(&PipelineStage::Saved));
    assert!(events.iter().any(|e| matches!(
        e,
        PipelineEvent::Finished { record } if record.keywords.adobe.en.len() == 49
    )));
    assert!(matches!(
        events.last(),
        Some(PipelineEvent::Autosaved { saved: false, .. })
    ));
    // A full Adobe set needs no padding request
    assert_eq!(h.completion.vision_calls(), 4);
}

#[tokio::test]
async fn explicit_save_surfaces_store_errors() {
    let dir = tempdir().unwrap();
    let folder = folder_with(dir.path(), &["beach.png"]);
    let asset = MediaAsset::new(folder.join("beach.png")).unwrap();
    let mut record = stockmeta_core::MetadataRecord::new(
        &asset,
        Default::default(),
        Default::default(),
    );
    record.created_at = Default::default();
    let epoch = record.created_at;

    let ok = harness(dir.path(), csv_store());
    ok.orchestrator.save(&mut record).await.unwrap();
    assert_ne!(record.created_at, epoch);
    let stored = CsvRecordStore::new().load(&folder).await.unwrap();
    assert_eq!(stored.get(&record.path), Some(&record));

    let failing = harness(dir.path(), Arc::new(FailingStore));
    let err = failing.orchestrator.save(&mut record).await.unwrap_err();
    assert!(matches!(err, AppError::Persistence(_)));
}
