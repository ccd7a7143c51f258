mod common;

use common::{dir_is_empty, test_config, AudioBehavior, FakeModel, FakeResolver, FakeTranscriber};
use recipe_extract::model::VideoInfo;
use recipe_extract::{ExtractConfig, ExtractError, Orchestrator, RecipeExtractor, StrategyError};
use std::path::Path;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

const COOKIES: &str = ".instagram.com\tTRUE\t/\tTRUE\t0\tsessionid\ttest-session";

fn video_info() -> VideoInfo {
    VideoInfo {
        title: "Crispy Potatoes".to_string(),
        description: String::new(),
        duration: 45.0,
        ..Default::default()
    }
}

fn config_with_cookies(scratch: &Path) -> ExtractConfig {
    let mut config = test_config(scratch);
    config.video.cookies = Some(COOKIES.to_string());
    config
}

fn orchestrator(config: ExtractConfig, resolver: Arc<FakeResolver>) -> Orchestrator {
    RecipeExtractor::builder()
        .config(config)
        .completion_provider(FakeModel::new(
            r#"{"ingredients": ["potatoes"], "instructions": ["Roast"]}"#,
        ))
        .transcriber(Arc::new(FakeTranscriber("roast the potatoes until crisp")))
        .video_resolver(resolver)
        .build_orchestrator()
        .unwrap()
}

#[tokio::test]
async fn test_artifacts_removed_after_success() {
    let scratch = tempfile::tempdir().unwrap();
    let server = mockito::Server::new_async().await;
    let resolver = Arc::new(FakeResolver::new(Ok(video_info())));

    let recipe = orchestrator(config_with_cookies(scratch.path()), resolver.clone())
        .extract(&format!("{}/reel/1", server.url()))
        .await
        .unwrap();

    assert_eq!(recipe.ingredients, vec!["potatoes"]);
    assert!(recipe.notes.contains("audio transcription"));
    assert_eq!(resolver.downloads.load(Ordering::SeqCst), 1);
    assert_eq!(resolver.cookie_files.lock().unwrap().len(), 1);
    assert!(dir_is_empty(scratch.path()));
}

#[tokio::test]
async fn test_artifacts_removed_after_failure() {
    let scratch = tempfile::tempdir().unwrap();
    let server = mockito::Server::new_async().await;
    // Untitled with no description: only a transcript could rescue it.
    let untitled = VideoInfo {
        title: String::new(),
        ..video_info()
    };
    let resolver = Arc::new(FakeResolver::new(Ok(untitled)).with_audio(AudioBehavior::Fail));

    let err = orchestrator(config_with_cookies(scratch.path()), resolver.clone())
        .extract(&format!("{}/reel/2", server.url()))
        .await
        .unwrap_err();

    let ExtractError::ExtractionFailed { attempts } = err else {
        panic!("unexpected error");
    };
    assert!(matches!(
        attempts.last().and_then(|a| a.cause.clone()),
        Some(StrategyError::TranscriptUnavailable(_))
    ));
    assert_eq!(resolver.downloads.load(Ordering::SeqCst), 1);
    assert!(dir_is_empty(scratch.path()));
}

#[tokio::test]
async fn test_artifacts_removed_after_panic() {
    let scratch = tempfile::tempdir().unwrap();
    let server = mockito::Server::new_async().await;
    let resolver =
        Arc::new(FakeResolver::new(Ok(video_info())).with_audio(AudioBehavior::Panic));
    let orchestrator = orchestrator(config_with_cookies(scratch.path()), resolver.clone());
    let url = format!("{}/reel/3", server.url());

    let join = tokio::spawn(async move { orchestrator.extract(&url).await }).await;

    assert!(join.unwrap_err().is_panic());
    assert_eq!(resolver.downloads.load(Ordering::SeqCst), 1);
    let cookie_file = resolver.cookie_files.lock().unwrap()[0].clone();
    assert!(!cookie_file.exists());
    assert!(dir_is_empty(scratch.path()));
}

#[tokio::test]
async fn test_artifacts_removed_when_deadline_cancels() {
    let scratch = tempfile::tempdir().unwrap();
    let server = mockito::Server::new_async().await;
    let resolver = Arc::new(
        FakeResolver::new(Ok(video_info())).with_resolve_delay(Duration::from_secs(30)),
    );
    let mut config = config_with_cookies(scratch.path());
    config.request_deadline_secs = Some(2);

    let err = orchestrator(config, resolver.clone())
        .extract(&format!("{}/reel/4", server.url()))
        .await
        .unwrap_err();

    let ExtractError::ExtractionFailed { attempts } = err else {
        panic!("unexpected error");
    };
    assert_eq!(
        attempts.last().and_then(|a| a.cause.clone()),
        Some(StrategyError::DeadlineExceeded(2))
    );
    assert_eq!(resolver.cookie_files.lock().unwrap().len(), 1);
    assert!(dir_is_empty(scratch.path()));
}

#[tokio::test]
async fn test_concurrent_requests_use_separate_cookie_jars() {
    let scratch = tempfile::tempdir().unwrap();
    let server = mockito::Server::new_async().await;
    let resolver = Arc::new(
        FakeResolver::new(Ok(video_info())).with_resolve_delay(Duration::from_millis(200)),
    );
    let orchestrator = Arc::new(orchestrator(
        config_with_cookies(scratch.path()),
        resolver.clone(),
    ));

    let a = {
        let orchestrator = orchestrator.clone();
        let url = format!("{}/reel/a", server.url());
        tokio::spawn(async move { orchestrator.extract(&url).await })
    };
    let b = {
        let orchestrator = orchestrator.clone();
        let url = format!("{}/reel/b", server.url());
        tokio::spawn(async move { orchestrator.extract(&url).await })
    };
    assert!(a.await.unwrap().is_ok());
    assert!(b.await.unwrap().is_ok());

    let jars = resolver.cookie_files.lock().unwrap().clone();
    assert_eq!(jars.len(), 2);
    assert_ne!(jars[0], jars[1]);
    assert!(dir_is_empty(scratch.path()));
}
