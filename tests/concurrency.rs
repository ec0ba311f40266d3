//! Concurrent registration and dispatch against one router.

use std::sync::Arc;

use axum::http::StatusCode;
use http_mux::routing::Router;
use tokio::sync::Barrier;

mod common;
use common::{body_text, send};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_registration_and_dispatch() {
    let writers = 16;
    let routes_per_writer = 50;
    let readers = 16;

    let router = Router::new();
    router.handle("/stable/:id", |_req| async { "stable" }).unwrap();

    let barrier = Arc::new(Barrier::new(writers + readers));
    let mut tasks = Vec::new();

    for w in 0..writers {
        let router = router.clone();
        let barrier = barrier.clone();
        tasks.push(tokio::spawn(async move {
            barrier.wait().await;
            for i in 0..routes_per_writer {
                router
                    .handle(&format!("/w{w}/r{i}/:id"), |_req| async { "dynamic" })
                    .unwrap()
                    .get();
                // Every writer also hammers the same shape key.
                router
                    .handle("/shared/:anything", |_req| async { "shared" })
                    .unwrap();
                tokio::task::yield_now().await;
            }
        }));
    }

    for _ in 0..readers {
        let router = router.clone();
        let barrier = barrier.clone();
        tasks.push(tokio::spawn(async move {
            barrier.wait().await;
            for i in 0..routes_per_writer {
                let response = send(&router, "GET", &format!("/stable/{i}")).await;
                assert_eq!(response.status(), StatusCode::OK);
                assert_eq!(body_text(response).await, "stable");
            }
        }));
    }

    for task in tasks {
        task.await.unwrap();
    }

    // stable + one per writer route + one shared entry
    assert_eq!(router.route_count(), 1 + writers * routes_per_writer + 1);

    for w in 0..writers {
        for i in [0, routes_per_writer - 1] {
            let response = send(&router, "GET", &format!("/w{w}/r{i}/7")).await;
            assert_eq!(response.status(), StatusCode::OK);
        }
    }
    assert_eq!(body_text(send(&router, "GET", "/shared/x").await).await, "shared");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_group_creation_is_unique() {
    let router = Router::new();
    let mut tasks = Vec::new();

    for _ in 0..32 {
        let router = router.clone();
        tasks.push(tokio::task::spawn_blocking(move || {
            router
                .group("/race", |g| {
                    g.handle("/x", |_req| async { "x" })?;
                    Ok(())
                })
                .is_ok()
        }));
    }

    let mut created = 0;
    for task in tasks {
        if task.await.unwrap() {
            created += 1;
        }
    }

    assert_eq!(created, 1);
    assert_eq!(router.group_prefixes(), vec!["/race"]);
}
