//! Installed-app authorization flow
//!
//! Opens the consent page in a browser and waits on a loopback listener for
//! Google to redirect back with an authorization code.

use std::collections::HashMap;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tracing::{info, warn};

use super::provider::google::{generate_code_challenge, generate_code_verifier};
use super::provider::{OAuthProvider, OAuthTokens};
use super::ClientSecrets;

/// Opens the authorization URL for the user.
pub type BrowserOpener = Box<dyn Fn(&str) -> std::io::Result<()> + Send + Sync>;

/// Open URLs with the platform's default browser.
pub fn system_browser() -> BrowserOpener {
    Box::new(|url: &str| open::that(url))
}

/// Run the PKCE loopback flow to completion and exchange the code.
pub async fn run_local_server<P: OAuthProvider>(
    provider: &P,
    client: &ClientSecrets,
    scopes: &[String],
    wait: Duration,
    browser: &(dyn Fn(&str) -> std::io::Result<()> + Send + Sync),
) -> Result<OAuthTokens, String> {
    let code_verifier = generate_code_verifier();
    let code_challenge = generate_code_challenge(&code_verifier);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .map_err(|e| format!("Failed to bind local server: {}", e))?;
    let local_addr = listener
        .local_addr()
        .map_err(|e| format!("Failed to get local address: {}", e))?;

    let redirect_uri = format!("http://127.0.0.1:{}", local_addr.port());
    info!("OAuth callback server listening on {}", redirect_uri);

    let state = generate_state();
    let auth_url = provider.authorize_url(client, scopes, &state, &code_challenge, &redirect_uri);

    info!("Please visit this URL to authorize access: {}", auth_url);
    if let Err(e) = browser(&auth_url) {
        warn!("Failed to open browser automatically: {}", e);
    }

    let code = timeout(wait, wait_for_code(&listener, &state))
        .await
        .map_err(|_| format!("Authorization timed out after {} seconds", wait.as_secs()))?
        .map_err(|e| format!("Callback server error: {}", e))?;

    provider
        .exchange_code(client, &code, &code_verifier, &redirect_uri)
        .await
}

/// Accept callbacks until one carries our `state` plus a code or an error.
async fn wait_for_code(listener: &TcpListener, state: &str) -> std::io::Result<String> {
    loop {
        let (mut socket, _) = listener.accept().await?;

        let mut reader = BufReader::new(&mut socket);
        let mut request_line = String::new();
        reader.read_line(&mut request_line).await?;

        // "GET /path?query HTTP/1.1"
        let parts: Vec<&str> = request_line.split_whitespace().collect();
        if parts.len() < 2 {
            continue;
        }

        let query = parts[1].split_once('?').map(|(_, q)| q).unwrap_or("");
        let params = parse_query_params(query);

        if let (Some(code), Some(received_state)) = (params.get("code"), params.get("state")) {
            if received_state != state {
                let html = callback_html("Error: Invalid state parameter. Please try again.");
                send_response(&mut socket, "400 Bad Request", html).await?;
                return Err(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    "State mismatch",
                ));
            }

            let html = callback_html("Authentication successful! You can close this tab.");
            send_response(&mut socket, "200 OK", html).await?;
            return Ok(code.clone());
        } else if let Some(error) = params.get("error") {
            let desc = params
                .get("error_description")
                .map(|s| s.as_str())
                .unwrap_or("Unknown error");
            let html = callback_html(&format!("Error: {} - {}", error, desc));
            send_response(&mut socket, "400 Bad Request", html).await?;
            return Err(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                format!("{}: {}", error, desc),
            ));
        }

        // Anything else (favicon, probes) is ignored.
        send_response(&mut socket, "404 Not Found", String::new()).await?;
    }
}

// ── Helpers ─────────────────────────────────────────────────────────────────

/// Random state string for CSRF protection
fn generate_state() -> String {
    use rand::Rng;
    let bytes: [u8; 16] = rand::rngs::OsRng.gen();
    hex::encode(bytes)
}

/// Parse URL query parameters into a HashMap
pub(crate) fn parse_query_params(query: &str) -> HashMap<String, String> {
    query
        .split('&')
        .filter_map(|part| {
            let (key, value) = part.split_once('=')?;
            let decoded = urlencoding::decode(value).ok()?;
            Some((key.to_string(), decoded.into_owned()))
        })
        .collect()
}

async fn send_response(socket: &mut TcpStream, status: &str, html: String) -> std::io::Result<()> {
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        html.len(),
        html
    );
    socket.write_all(response.as_bytes()).await?;
    socket.flush().await?;
    Ok(())
}

fn callback_html(message: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>slidesmith authorization</title></head>
<body style="font-family: sans-serif; text-align: center; margin-top: 4rem;">
<p>{}</p>
</body>
</html>"#,
        message
    )
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::auth::provider::google::GoogleProvider;
    use chrono::Utc;

    /// Browser stand-in that immediately hits the redirect URI with `code`
    /// (or with `error`, when `code` is `None`).
    pub(crate) fn consenting_browser(code: Option<&'static str>) -> BrowserOpener {
        Box::new(move |url: &str| {
            let query = url.split_once('?').map(|(_, q)| q).unwrap_or("");
            let params = parse_query_params(query);
            let redirect = params["redirect_uri"].clone();
            let state = params["state"].clone();
            let callback = match code {
                Some(code) => format!("{}/?state={}&code={}&scope=x", redirect, state, code),
                None => format!("{}/?error=access_denied&state={}", redirect, state),
            };
            tokio::spawn(async move {
                let client = reqwest::Client::builder().no_proxy().build().unwrap();
                let _ = client.get(callback).send().await;
            });
            Ok(())
        })
    }

    /// Provider whose code exchange never touches the network.
    struct OfflineExchange;

    impl OAuthProvider for OfflineExchange {
        fn name(&self) -> &str {
            "offline"
        }

        fn authorize_url(
            &self,
            client: &ClientSecrets,
            scopes: &[String],
            state: &str,
            code_challenge: &str,
            redirect_uri: &str,
        ) -> String {
            GoogleProvider.authorize_url(client, scopes, state, code_challenge, redirect_uri)
        }

        async fn exchange_code(
            &self,
            _client: &ClientSecrets,
            code: &str,
            code_verifier: &str,
            redirect_uri: &str,
        ) -> Result<OAuthTokens, String> {
            assert!(code_verifier.len() >= 43);
            assert!(redirect_uri.starts_with("http://127.0.0.1:"));
            Ok(OAuthTokens {
                access_token: format!("access-for-{}", code),
                refresh_token: Some("refresh".to_string()),
                expires_at: Utc::now() + chrono::Duration::hours(1),
                scopes: vec![],
            })
        }

        async fn refresh_token(&self, _: &str, _: &str, _: &str, _: &str) -> Result<OAuthTokens, String> {
            Err("not used".to_string())
        }
    }

    fn client() -> ClientSecrets {
        ClientSecrets::new("cid", "secret")
    }

    #[test]
    fn test_parse_query_params() {
        let params = parse_query_params("code=4%2F0Ab&state=xyz&flag");
        assert_eq!(params["code"], "4/0Ab");
        assert_eq!(params["state"], "xyz");
        assert!(!params.contains_key("flag"));
    }

    #[tokio::test]
    async fn test_flow_exchanges_code() {
        let browser = consenting_browser(Some("abc"));
        let tokens = run_local_server(
            &OfflineExchange,
            &client(),
            &["openid".to_string()],
            Duration::from_secs(10),
            &*browser,
        )
        .await
        .unwrap();
        assert_eq!(tokens.access_token, "access-for-abc");
    }

    #[tokio::test]
    async fn test_flow_reports_denied_consent() {
        let browser = consenting_browser(None);
        let err = run_local_server(
            &OfflineExchange,
            &client(),
            &["openid".to_string()],
            Duration::from_secs(10),
            &*browser,
        )
        .await
        .unwrap_err();
        assert!(err.contains("access_denied"));
    }

    #[tokio::test]
    async fn test_flow_times_out() {
        let browser: BrowserOpener = Box::new(|_: &str| Ok(()));
        let err = run_local_server(
            &OfflineExchange,
            &client(),
            &["openid".to_string()],
            Duration::from_millis(50),
            &*browser,
        )
        .await
        .unwrap_err();
        assert!(err.contains("timed out"));
    }
}
