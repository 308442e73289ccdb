use std::time::Duration;

/// Poll a URL until it answers 2xx, panicking after ~1s.
pub async fn wait_http_ok(client: &reqwest::Client, url: &str) {
    for _ in 0..50 {
        if let Ok(resp) = client.get(url).send().await
            && resp.status().is_success()
        {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("server at {url} did not become ready");
}
