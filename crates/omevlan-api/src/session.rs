// OME session authentication
//
// `POST SessionService/Sessions` returns the token in the `X-Auth-Token`
// response header and the session resource (with its id) in the body.
// The token rides on every later request; logout deletes the session.

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};

use crate::client::{AUTH_TOKEN_HEADER, OmeClient, Session};
use crate::error::Error;
use crate::models::{SessionInfo, SessionRequest};

const SESSIONS_PATH: &str = "SessionService/Sessions";

impl OmeClient {
    /// Open an API session with username/password.
    ///
    /// On success the token is stored on the client and sent with every
    /// subsequent request.
    pub async fn login(&mut self, username: &str, password: &SecretString) -> Result<(), Error> {
        let url = self.url(SESSIONS_PATH)?;
        debug!("opening session at {}", url);

        let body = SessionRequest {
            user_name: username,
            password: password.expose_secret(),
            session_type: "API",
        };

        let resp = self
            .http()
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Authentication {
                message: format!("login failed (HTTP {status}): {body}"),
            });
        }

        let token = resp
            .headers()
            .get(AUTH_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
            .ok_or_else(|| Error::Authentication {
                message: format!("login response carried no {AUTH_TOKEN_HEADER} header"),
            })?;

        let text = resp.text().await.map_err(|e| self.classify(e))?;
        let info: SessionInfo =
            serde_json::from_str(&text).map_err(|e| Error::Deserialization {
                message: format!("invalid session resource: {e}"),
                body: text.clone(),
            })?;

        self.set_session(Session {
            id: info.id,
            token: SecretString::from(token),
        });
        debug!("login successful");
        Ok(())
    }

    /// Close the current session, if any.
    ///
    /// Failures are logged and swallowed: the session expires on the
    /// appliance anyway and the caller's outcome is already decided.
    pub async fn logout(&mut self) {
        let Some(session) = self.take_session() else {
            return;
        };
        let path = format!("{SESSIONS_PATH}('{}')", session.id);
        debug!(session_id = %session.id, "closing session");

        // Re-attach the token for this one request.
        self.set_session(session);
        let result = self.invoke(reqwest::Method::DELETE, &path, None).await;
        self.take_session();

        if let Err(err) = result {
            warn!(error = %err, "session logout failed");
        }
    }
}
