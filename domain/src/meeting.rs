//! The meeting created on every successful authorization.

use chrono::{DateTime, Duration, Timelike, Utc};
use log::*;
use secrecy::SecretString;
use serde::{Serialize, Serializer};
use service::config::Config;

use crate::error::Error;
use crate::gateway::zoom;

/// Zoom meeting type codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "u8")]
pub enum MeetingType {
    Instant,
    Scheduled,
    RecurringNoFixedTime,
    RecurringFixedTime,
}

impl From<MeetingType> for u8 {
    fn from(value: MeetingType) -> Self {
        match value {
            MeetingType::Instant => 1,
            MeetingType::Scheduled => 2,
            MeetingType::RecurringNoFixedTime => 3,
            MeetingType::RecurringFixedTime => 8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "u8")]
pub enum ApprovalType {
    Automatic,
    Manual,
    NoRegistration,
}

impl From<ApprovalType> for u8 {
    fn from(value: ApprovalType) -> Self {
        match value {
            ApprovalType::Automatic => 0,
            ApprovalType::Manual => 1,
            ApprovalType::NoRegistration => 2,
        }
    }
}

/// How attendees register for recurring meetings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "u8")]
pub enum RegistrationType {
    /// Register once, attend any occurrence.
    Once,
    /// Register for each occurrence.
    EachOccurrence,
    /// Register once, choose occurrences.
    ChooseOccurrences,
}

impl From<RegistrationType> for u8 {
    fn from(value: RegistrationType) -> Self {
        match value {
            RegistrationType::Once => 1,
            RegistrationType::EachOccurrence => 2,
            RegistrationType::ChooseOccurrences => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Audio {
    Both,
    Telephony,
    Voip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AutoRecording {
    Local,
    Cloud,
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeetingSettings {
    pub host_video: bool,
    pub participant_video: bool,
    pub join_before_host: bool,
    pub mute_upon_entry: bool,
    pub watermark: bool,
    pub use_pmi: bool,
    pub approval_type: ApprovalType,
    pub registration_type: RegistrationType,
    pub audio: Audio,
    pub auto_recording: AutoRecording,
}

impl Default for MeetingSettings {
    fn default() -> Self {
        Self {
            host_video: true,
            participant_video: true,
            join_before_host: false,
            mute_upon_entry: true,
            watermark: true,
            use_pmi: false,
            approval_type: ApprovalType::Automatic,
            registration_type: RegistrationType::Once,
            audio: Audio::Both,
            auto_recording: AutoRecording::Cloud,
        }
    }
}

/// Body of the meeting-creation request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeetingRequest {
    pub topic: String,
    #[serde(rename = "type")]
    pub meeting_type: MeetingType,
    /// Sent as `yyyy-MM-ddTHH:mm:ssZ`.
    #[serde(serialize_with = "serialize_start_time")]
    pub start_time: DateTime<Utc>,
    /// Minutes.
    pub duration: u32,
    pub timezone: String,
    pub agenda: String,
    pub settings: MeetingSettings,
}

fn serialize_start_time<S: Serializer>(
    start_time: &DateTime<Utc>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&start_time.format("%Y-%m-%dT%H:%M:%SZ").to_string())
}

impl Default for MeetingRequest {
    /// A one-hour scheduled meeting starting an hour from now.
    fn default() -> Self {
        Self {
            topic: "Automated Meeting".to_string(),
            meeting_type: MeetingType::Scheduled,
            start_time: start_after(Utc::now(), 60),
            duration: 60,
            timezone: "UTC".to_string(),
            agenda: "This is an automated meeting".to_string(),
            settings: MeetingSettings::default(),
        }
    }
}

impl MeetingRequest {
    /// Builds the request from process configuration, starting the configured
    /// lead time after `now`.
    pub fn from_config(config: &Config, now: DateTime<Utc>) -> Self {
        Self {
            topic: config.meeting_topic().to_string(),
            start_time: start_after(now, config.meeting_lead_time_minutes),
            duration: config.meeting_duration_minutes,
            timezone: config.meeting_timezone().to_string(),
            agenda: config.meeting_agenda().to_string(),
            ..Self::default()
        }
    }
}

fn start_after(now: DateTime<Utc>, lead_time_minutes: u32) -> DateTime<Utc> {
    let start = now + Duration::minutes(i64::from(lead_time_minutes));
    start
        .with_second(0)
        .and_then(|start| start.with_nanosecond(0))
        .unwrap_or(start)
}

/// Creates the configured meeting and returns its join URL.
pub async fn schedule_meeting(
    config: &Config,
    client: &zoom::Client,
    access_token: &SecretString,
) -> Result<String, Error> {
    let request = MeetingRequest::from_config(config, Utc::now());
    debug!(
        "Scheduling \"{}\" at {} for {} minutes",
        request.topic, request.start_time, request.duration
    );

    client.create_meeting(access_token, &request).await
}
