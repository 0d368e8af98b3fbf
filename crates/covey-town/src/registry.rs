//! Town registry: creates, tracks, and resolves towns.

use std::collections::HashMap;

use covey_protocol::{InvitationId, TownId, TownSummary};
use covey_session::{generate_id, generate_token, TOWN_ID_LENGTH};

use crate::town::{spawn_town, TownSeed};
use crate::{TownConfig, TownError, TownHandle, TownInfo};

/// Default command channel size for town actors.
const DEFAULT_CHANNEL_SIZE: usize = 64;

/// The result of creating a town.
///
/// `update_password` is handed out exactly once, here. Nothing else in
/// the registry ever returns it.
#[derive(Debug, Clone)]
pub struct CreatedTown {
    pub town_id: TownId,
    pub update_password: String,
}

/// The process-wide directory of towns.
///
/// This is the single source of truth for which towns exist: callers
/// resolve a handle by id on every request instead of caching one across
/// registry mutations. Like the session manager it is a plain struct;
/// the server wraps it in a mutex.
pub struct TownRegistry {
    config: TownConfig,

    /// Live towns, keyed by town id.
    towns: HashMap<TownId, TownHandle>,

    /// Invitation id → town id, kept in sync with `towns`.
    invitations: HashMap<InvitationId, TownId>,
}

impl TownRegistry {
    /// Creates an empty registry whose towns use `config`.
    pub fn new(config: TownConfig) -> Self {
        Self {
            config,
            towns: HashMap::new(),
            invitations: HashMap::new(),
        }
    }

    /// Creates a town and starts its actor.
    ///
    /// # Errors
    /// Returns [`TownError::Validation`] if `friendly_name` is empty.
    pub fn create_town(
        &mut self,
        friendly_name: &str,
        is_publicly_listed: bool,
    ) -> Result<CreatedTown, TownError> {
        if friendly_name.is_empty() {
            return Err(TownError::Validation(
                "FriendlyName must be specified".into(),
            ));
        }

        let town_id = loop {
            let candidate = TownId::new(generate_id(TOWN_ID_LENGTH));
            if !self.towns.contains_key(&candidate) {
                break candidate;
            }
        };
        let invitation_id = loop {
            let candidate = InvitationId::new(generate_token());
            if !self.invitations.contains_key(&candidate) {
                break candidate;
            }
        };
        let update_password = generate_token();

        let handle = spawn_town(
            TownSeed {
                town_id: town_id.clone(),
                invitation_id: invitation_id.clone(),
                friendly_name: friendly_name.to_string(),
                is_publicly_listed,
                update_password: update_password.clone(),
                capacity: self.config.capacity,
            },
            DEFAULT_CHANNEL_SIZE,
        );

        self.invitations.insert(invitation_id, town_id.clone());
        self.towns.insert(town_id.clone(), handle);
        tracing::info!(%town_id, is_publicly_listed, "town created");

        Ok(CreatedTown {
            town_id,
            update_password,
        })
    }

    /// Deletes a town if `password` matches its update password.
    ///
    /// Every bound channel in the town is closed. Returns `false` for a
    /// wrong password and for an unknown town alike.
    pub async fn delete_town(&mut self, town_id: &TownId, password: &str) -> bool {
        let Some(handle) = self.town(town_id) else {
            return false;
        };

        match handle.delete(password).await {
            Ok(true) => {
                self.remove(town_id);
                tracing::info!(%town_id, "town deleted");
                true
            }
            Ok(false) => false,
            Err(e) => {
                // The actor is gone; drop the stale entry.
                tracing::warn!(%town_id, error = %e, "town actor vanished");
                self.remove(town_id);
                false
            }
        }
    }

    /// Updates the fields that are `Some`, if `password` matches.
    pub async fn update_town(
        &self,
        town_id: &TownId,
        password: &str,
        friendly_name: Option<String>,
        is_publicly_listed: Option<bool>,
    ) -> bool {
        let Some(handle) = self.towns.get(town_id) else {
            return false;
        };
        handle
            .update(password, friendly_name, is_publicly_listed)
            .await
            .unwrap_or(false)
    }

    /// Lists publicly listed towns with their occupancy.
    ///
    /// Towns that fail to respond (e.g., mid-deletion) are skipped.
    pub async fn list_towns(&self) -> Vec<TownSummary> {
        let mut summaries = Vec::with_capacity(self.towns.len());
        for handle in self.towns.values() {
            if let Ok(info) = handle.info().await {
                if info.is_publicly_listed {
                    summaries.push(TownSummary {
                        friendly_name: info.friendly_name,
                        covey_town_id: info.town_id,
                        current_occupancy: info.occupancy,
                        maximum_occupancy: info.capacity,
                    });
                }
            }
        }
        summaries
    }

    /// Resolves a town by id.
    pub fn town(&self, town_id: &TownId) -> Option<TownHandle> {
        self.towns.get(town_id).cloned()
    }

    /// Resolves a town by its invitation id.
    pub fn town_by_invitation(
        &self,
        invitation_id: &InvitationId,
    ) -> Option<TownHandle> {
        self.invitations
            .get(invitation_id)
            .and_then(|town_id| self.town(town_id))
    }

    /// Returns a snapshot of a town's current state.
    pub async fn town_info(&self, town_id: &TownId) -> Result<TownInfo, TownError> {
        let handle = self
            .towns
            .get(town_id)
            .ok_or_else(|| TownError::NotFound(town_id.clone()))?;
        handle.info().await
    }

    /// Returns the number of live towns.
    pub fn town_count(&self) -> usize {
        self.towns.len()
    }

    fn remove(&mut self, town_id: &TownId) {
        if let Some(handle) = self.towns.remove(town_id) {
            self.invitations.remove(handle.invitation_id());
        }
    }
}

impl Default for TownRegistry {
    fn default() -> Self {
        Self::new(TownConfig::default())
    }
}
