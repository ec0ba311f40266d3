//! End-to-end tests through the host server.

use axum::body::Body;
use axum::http::Request;
use http_mux::routing::{PathParams, Router};

mod common;

fn demo_router() -> Router {
    let router = Router::new();
    router.not_found(|req: Request<Body>| async move {
        (
            axum::http::StatusCode::NOT_FOUND,
            format!("Not Found : {}", req.uri()),
        )
    });
    router.use_middleware(|_req, _sink| {});
    router
        .handle("/hello", |req: Request<Body>| async move {
            format!("hello world Method:{}\n", req.method())
        })
        .unwrap()
        .all();
    router
        .handle("/hello/:key/world/:value", |req: Request<Body>| async move {
            let params = req.extensions().get::<PathParams>().cloned().unwrap_or_default();
            format!(
                "hello key:{} value:{}\n",
                params.get("key").unwrap_or(""),
                params.get("value").unwrap_or("")
            )
        })
        .unwrap()
        .get()
        .post()
        .put()
        .delete();
    router
        .group("/group", |g| {
            g.handle("/foo/:id", |req: Request<Body>| async move {
                let params = req.extensions().get::<PathParams>().cloned().unwrap_or_default();
                format!("group/foo id:{}\n", params.get("id").unwrap_or(""))
            })?
            .get();
            g.handle("/bar/:id", |req: Request<Body>| async move {
                let params = req.extensions().get::<PathParams>().cloned().unwrap_or_default();
                format!("group/bar id:{}\n", params.get("id").unwrap_or(""))
            })?
            .get();
            Ok(())
        })
        .unwrap();
    router
}

#[tokio::test]
async fn test_serves_routes_over_http() {
    let (addr, shutdown) = common::start_server(demo_router()).await;
    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    let base = format!("http://{}", addr);

    let res = client.get(format!("{base}/hello")).send().await.unwrap();
    assert_eq!(res.status(), 200);
    assert!(res.headers().contains_key("x-request-id"));
    assert_eq!(res.text().await.unwrap(), "hello world Method:GET\n");

    let res = client.post(format!("{base}/hello")).send().await.unwrap();
    assert_eq!(res.text().await.unwrap(), "hello world Method:POST\n");

    let res = client.head(format!("{base}/hello")).send().await.unwrap();
    assert_eq!(res.status(), 200);

    let res = client
        .get(format!("{base}/hello/123/world/456"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.text().await.unwrap(), "hello key:123 value:456\n");

    let res = client
        .patch(format!("{base}/hello/123/world/456"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);

    let res = client.get(format!("{base}/group/foo/1")).send().await.unwrap();
    assert_eq!(res.text().await.unwrap(), "group/foo id:1\n");

    let res = client.get(format!("{base}/group/bar/2")).send().await.unwrap();
    assert_eq!(res.text().await.unwrap(), "group/bar id:2\n");

    let res = client.get(format!("{base}/missing")).send().await.unwrap();
    assert_eq!(res.status(), 404);
    assert_eq!(res.text().await.unwrap(), "Not Found : /missing");

    shutdown.trigger();
}

#[tokio::test]
async fn test_client_request_id_is_kept() {
    let (addr, shutdown) = common::start_server(demo_router()).await;
    let client = reqwest::Client::builder().no_proxy().build().unwrap();

    let res = client
        .get(format!("http://{}/hello", addr))
        .header("x-request-id", "fixed-id")
        .send()
        .await
        .unwrap();
    assert_eq!(res.headers()["x-request-id"], "fixed-id");

    shutdown.trigger();
}
