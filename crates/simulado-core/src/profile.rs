//! Learner profile and its persistent store.
//!
//! The profile is the only long-lived record. [`ProfileStore`] is an explicit
//! handle: components that need the profile are given the store, and can
//! subscribe to changes through a `tokio::sync::watch` channel.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::watch;

use crate::error::StorageError;
use crate::model::{Proficiency, Subject, SubjectMap};
use crate::store::{read_json, write_json, KeyValueStore, PROFILE_KEY};

/// The learner profile.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub name: String,
    pub target_course: String,
    pub target_university: String,
    pub proficiencies: SubjectMap<Proficiency>,
    pub is_onboarded: bool,
}

impl Profile {
    pub fn proficiency(&self, subject: Subject) -> Proficiency {
        *self.proficiencies.get(subject)
    }

    /// First name, for greetings.
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or("")
    }

    /// Subject to recommend studying: the first one rated low, else math.
    pub fn weakest_subject(&self) -> Subject {
        self.proficiencies
            .iter()
            .find(|(_, level)| **level == Proficiency::Low)
            .map(|(subject, _)| subject)
            .unwrap_or(Subject::Math)
    }
}

/// A partial profile; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub target_course: Option<String>,
    pub target_university: Option<String>,
    /// Replaces the whole map when present.
    pub proficiencies: Option<SubjectMap<Proficiency>>,
    pub is_onboarded: Option<bool>,
}

impl ProfileUpdate {
    fn apply(self, profile: &mut Profile) {
        if let Some(name) = self.name {
            profile.name = name;
        }
        if let Some(course) = self.target_course {
            profile.target_course = course;
        }
        if let Some(university) = self.target_university {
            profile.target_university = university;
        }
        if let Some(proficiencies) = self.proficiencies {
            profile.proficiencies = proficiencies;
        }
        if let Some(onboarded) = self.is_onboarded {
            profile.is_onboarded = onboarded;
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OnboardingError {
    #[error("name is required")]
    MissingName,
    #[error("target course is required")]
    MissingCourse,
}

/// The onboarding form.
#[derive(Debug, Clone, Default)]
pub struct Onboarding {
    pub name: String,
    pub target_course: String,
    pub target_university: Option<String>,
    pub proficiencies: SubjectMap<Proficiency>,
}

impl Onboarding {
    /// Validate the form and turn it into an update that completes onboarding.
    pub fn into_update(self) -> Result<ProfileUpdate, OnboardingError> {
        let name = self.name.trim().to_string();
        let target_course = self.target_course.trim().to_string();
        if name.is_empty() {
            return Err(OnboardingError::MissingName);
        }
        if target_course.is_empty() {
            return Err(OnboardingError::MissingCourse);
        }

        Ok(ProfileUpdate {
            name: Some(name),
            target_course: Some(target_course),
            target_university: self.target_university.map(|u| u.trim().to_string()),
            proficiencies: Some(self.proficiencies),
            is_onboarded: Some(true),
        })
    }
}

/// Persistent, observable holder of the learner profile.
pub struct ProfileStore {
    store: Arc<dyn KeyValueStore>,
    current: watch::Sender<Profile>,
}

impl ProfileStore {
    /// Open the store and load the persisted profile (defaults if none).
    pub fn open(store: Arc<dyn KeyValueStore>) -> Self {
        let profile = read_json(store.as_ref(), PROFILE_KEY).unwrap_or_default();
        let (current, _) = watch::channel(profile);
        Self { store, current }
    }

    /// Re-read the persisted profile, falling back to defaults.
    pub fn load(&self) -> Profile {
        let profile: Profile = read_json(self.store.as_ref(), PROFILE_KEY).unwrap_or_default();
        self.current.send_replace(profile.clone());
        profile
    }

    /// The current profile.
    pub fn profile(&self) -> Profile {
        self.current.borrow().clone()
    }

    /// Merge `update` into the profile and persist the result.
    pub fn update(&self, update: ProfileUpdate) -> Result<Profile, StorageError> {
        let mut next = self.profile();
        update.apply(&mut next);
        write_json(self.store.as_ref(), PROFILE_KEY, &next)?;
        self.current.send_replace(next.clone());
        tracing::debug!(onboarded = next.is_onboarded, "profile updated");
        Ok(next)
    }

    /// Restore defaults and clear the persisted record.
    pub fn reset(&self) -> Result<Profile, StorageError> {
        self.store.remove(PROFILE_KEY)?;
        let profile = Profile::default();
        self.current.send_replace(profile.clone());
        tracing::info!("profile reset");
        Ok(profile)
    }

    /// Receive every subsequent profile change.
    pub fn subscribe(&self) -> watch::Receiver<Profile> {
        self.current.subscribe()
    }
}
