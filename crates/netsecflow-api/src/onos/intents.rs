// Intent endpoints

use tracing::debug;

use crate::error::Error;
use crate::onos::client::OnosClient;
use crate::onos::types::Intent;

impl OnosClient {
    /// Submit an intent for compilation.
    ///
    /// `POST /intents` (expects 201)
    pub async fn submit_intent(&self, intent: &Intent) -> Result<(), Error> {
        debug!(kind = intent.kind(), app_id = intent.app_id(), "submitting intent");
        self.post_created(self.endpoint(&["intents"]), intent)
            .await
            .map(|_| ())
    }
}
