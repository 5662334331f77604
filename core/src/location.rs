//! Meeting location decoder.
//!
//! # Design
//! A scheduled event's `location` is a tagged record whose shape depends on
//! its `type` field. The wire record is taken as an open `serde_json::Value`
//! so the discriminant can be inspected before committing to a shape: the
//! `type` string is matched against the nine known literals, the record is
//! then deserialized into that variant's wire entity, and the entity is
//! mapped onto the domain variant.
//!
//! Wire entities keep the remote snake_case names. Domain types serialize
//! with camelCase names and carry the discriminant back out as `type`, so a
//! decoded location re-serializes as `{"type": "zoom_conference", "joinUrl":
//! ..., ...}`.
//!
//! Conference data for GoToMeeting and Microsoft Teams is already camelCase
//! on the wire and is passed through untouched. Zoom data is snake_case on
//! the wire and is renamed field by field.

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::LocationError;

/// Discriminant of a meeting location record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocationType {
    Custom,
    InPersonMeeting,
    InboundCall,
    OutboundCall,
    InviteeSpecified,
    GoogleConference,
    GoToMeetingConference,
    MicrosoftTeamsConference,
    ZoomConference,
}

impl LocationType {
    pub const ALL: [LocationType; 9] = [
        LocationType::Custom,
        LocationType::InPersonMeeting,
        LocationType::InboundCall,
        LocationType::OutboundCall,
        LocationType::InviteeSpecified,
        LocationType::GoogleConference,
        LocationType::GoToMeetingConference,
        LocationType::MicrosoftTeamsConference,
        LocationType::ZoomConference,
    ];

    /// The literal carried in the wire record's `type` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            LocationType::Custom => "custom",
            LocationType::InPersonMeeting => "physical",
            LocationType::InboundCall => "inbound_call",
            LocationType::OutboundCall => "outbound_call",
            LocationType::InviteeSpecified => "ask_invitee",
            LocationType::GoogleConference => "google_conference",
            LocationType::GoToMeetingConference => "gotomeeting",
            LocationType::MicrosoftTeamsConference => "microsoft_teams_conference",
            LocationType::ZoomConference => "zoom_conference",
        }
    }
}

impl FromStr for LocationType {
    type Err = LocationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LocationType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| LocationError::UnknownLocationType(s.to_string()))
    }
}

impl fmt::Display for LocationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provisioning state of a video conference.
///
/// Values outside the four known states are kept verbatim in `Unknown`
/// rather than rejected, so a new remote state does not break decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ConferenceStatus {
    Initiated,
    Processing,
    Pushed,
    Failed,
    Unknown(String),
}

impl ConferenceStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ConferenceStatus::Initiated => "initiated",
            ConferenceStatus::Processing => "processing",
            ConferenceStatus::Pushed => "pushed",
            ConferenceStatus::Failed => "failed",
            ConferenceStatus::Unknown(raw) => raw,
        }
    }
}

impl From<String> for ConferenceStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "initiated" => ConferenceStatus::Initiated,
            "processing" => ConferenceStatus::Processing,
            "pushed" => ConferenceStatus::Pushed,
            "failed" => ConferenceStatus::Failed,
            _ => ConferenceStatus::Unknown(raw),
        }
    }
}

impl From<ConferenceStatus> for String {
    fn from(status: ConferenceStatus) -> Self {
        match status {
            ConferenceStatus::Unknown(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Domain
// ---------------------------------------------------------------------------

/// Where a scheduled event takes place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum MeetingLocation {
    #[serde(rename = "custom")]
    Custom { location: String },
    #[serde(rename = "physical")]
    InPersonMeeting { location: String },
    #[serde(rename = "inbound_call")]
    InboundCall { location: String },
    #[serde(rename = "outbound_call")]
    OutboundCall { location: String },
    #[serde(rename = "ask_invitee")]
    InviteeSpecified { location: String },
    #[serde(rename = "google_conference")]
    GoogleConference(GoogleConference),
    #[serde(rename = "gotomeeting")]
    GoToMeetingConference(GoToMeetingConference),
    #[serde(rename = "microsoft_teams_conference")]
    MicrosoftTeamsConference(MicrosoftTeamsConference),
    #[serde(rename = "zoom_conference")]
    ZoomConference(ZoomConference),
}

impl MeetingLocation {
    pub fn location_type(&self) -> LocationType {
        match self {
            MeetingLocation::Custom { .. } => LocationType::Custom,
            MeetingLocation::InPersonMeeting { .. } => LocationType::InPersonMeeting,
            MeetingLocation::InboundCall { .. } => LocationType::InboundCall,
            MeetingLocation::OutboundCall { .. } => LocationType::OutboundCall,
            MeetingLocation::InviteeSpecified { .. } => LocationType::InviteeSpecified,
            MeetingLocation::GoogleConference(_) => LocationType::GoogleConference,
            MeetingLocation::GoToMeetingConference(_) => LocationType::GoToMeetingConference,
            MeetingLocation::MicrosoftTeamsConference(_) => LocationType::MicrosoftTeamsConference,
            MeetingLocation::ZoomConference(_) => LocationType::ZoomConference,
        }
    }

    /// URL to join the conference, for the conference variants.
    pub fn join_url(&self) -> Option<&str> {
        match self {
            MeetingLocation::GoogleConference(c) => c.join_url.as_deref(),
            MeetingLocation::GoToMeetingConference(c) => c.join_url.as_deref(),
            MeetingLocation::MicrosoftTeamsConference(c) => c.join_url.as_deref(),
            MeetingLocation::ZoomConference(c) => c.join_url.as_deref(),
            _ => None,
        }
    }
}

/// Google Meet conference. `status` is kept as the raw wire string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleConference {
    pub status: String,
    pub join_url: Option<String>,
}

impl GoogleConference {
    pub fn conference_status(&self) -> ConferenceStatus {
        ConferenceStatus::from(self.status.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoToMeetingConference {
    pub status: ConferenceStatus,
    pub join_url: Option<String>,
    pub data: GoToMeetingConferenceData,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoToMeetingConferenceData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_meeting_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conference_call_info: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MicrosoftTeamsConference {
    pub status: ConferenceStatus,
    pub join_url: Option<String>,
    pub data: MicrosoftTeamsConferenceData,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MicrosoftTeamsConferenceData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_conferencing: Option<AudioConferencing>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioConferencing {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conference_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dialin_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub toll_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoomConference {
    pub status: ConferenceStatus,
    pub join_url: Option<String>,
    pub data: ZoomConferenceData,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoomConferenceData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<ZoomSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra: Option<ZoomExtra>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoomSettings {
    pub global_dial_in_numbers: Vec<ZoomDialInNumber>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoomDialInNumber {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub number_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoomExtra {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intl_numbers_url: Option<String>,
}

// ---------------------------------------------------------------------------
// Wire
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct TextLocationEntity {
    location: String,
}

#[derive(Deserialize)]
struct ConferenceEntity<D> {
    status: String,
    #[serde(default)]
    join_url: Option<String>,
    #[serde(default)]
    data: Option<D>,
}

#[derive(Default, Deserialize)]
struct ZoomConferenceDataEntity {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    settings: Option<ZoomSettingsEntity>,
    #[serde(default)]
    extra: Option<ZoomExtraEntity>,
    #[serde(default)]
    password: Option<String>,
}

#[derive(Deserialize)]
struct ZoomSettingsEntity {
    #[serde(default)]
    global_dial_in_numbers: Vec<ZoomDialInNumberEntity>,
}

#[derive(Deserialize)]
struct ZoomDialInNumberEntity {
    #[serde(default)]
    number: Option<String>,
    #[serde(default)]
    country: Option<String>,
    #[serde(rename = "type", default)]
    number_type: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    country_name: Option<String>,
}

#[derive(Deserialize)]
struct ZoomExtraEntity {
    #[serde(default)]
    intl_numbers_url: Option<String>,
}

impl From<ZoomConferenceDataEntity> for ZoomConferenceData {
    fn from(entity: ZoomConferenceDataEntity) -> Self {
        ZoomConferenceData {
            id: entity.id,
            settings: entity.settings.map(|settings| ZoomSettings {
                global_dial_in_numbers: settings
                    .global_dial_in_numbers
                    .into_iter()
                    .map(|record| ZoomDialInNumber {
                        number: record.number,
                        country: record.country,
                        number_type: record.number_type,
                        city: record.city,
                        country_name: record.country_name,
                    })
                    .collect(),
            }),
            extra: entity.extra.map(|extra| ZoomExtra {
                intl_numbers_url: extra.intl_numbers_url,
            }),
            password: entity.password,
        }
    }
}

/// Decode a wire location record into its domain variant.
///
/// The `type` field selects the variant. A record whose `type` is not one of
/// the nine known literals is rejected with `UnknownLocationType`; a record
/// whose remaining fields do not fit the selected shape is `Malformed`.
pub fn decode_location(record: &Value) -> Result<MeetingLocation, LocationError> {
    let raw_type = record
        .get("type")
        .and_then(Value::as_str)
        .ok_or(LocationError::MissingType)?;

    let location_type = raw_type.parse::<LocationType>().inspect_err(|_| {
        warn!(location_type = %raw_type, "meeting_location_unknown_type");
    })?;

    let location = match location_type {
        LocationType::Custom => MeetingLocation::Custom {
            location: text_location(record, location_type)?,
        },
        LocationType::InPersonMeeting => MeetingLocation::InPersonMeeting {
            location: text_location(record, location_type)?,
        },
        LocationType::InboundCall => MeetingLocation::InboundCall {
            location: text_location(record, location_type)?,
        },
        LocationType::OutboundCall => MeetingLocation::OutboundCall {
            location: text_location(record, location_type)?,
        },
        LocationType::InviteeSpecified => MeetingLocation::InviteeSpecified {
            location: text_location(record, location_type)?,
        },
        LocationType::GoogleConference => {
            let entity: ConferenceEntity<Value> = entity(record, location_type)?;
            MeetingLocation::GoogleConference(GoogleConference {
                status: entity.status,
                join_url: entity.join_url,
            })
        }
        LocationType::GoToMeetingConference => {
            let entity: ConferenceEntity<GoToMeetingConferenceData> = entity(record, location_type)?;
            MeetingLocation::GoToMeetingConference(GoToMeetingConference {
                status: entity.status.into(),
                join_url: entity.join_url,
                data: entity.data.unwrap_or_default(),
            })
        }
        LocationType::MicrosoftTeamsConference => {
            let entity: ConferenceEntity<MicrosoftTeamsConferenceData> =
                entity(record, location_type)?;
            MeetingLocation::MicrosoftTeamsConference(MicrosoftTeamsConference {
                status: entity.status.into(),
                join_url: entity.join_url,
                data: entity.data.unwrap_or_default(),
            })
        }
        LocationType::ZoomConference => {
            let entity: ConferenceEntity<ZoomConferenceDataEntity> = entity(record, location_type)?;
            MeetingLocation::ZoomConference(ZoomConference {
                status: entity.status.into(),
                join_url: entity.join_url,
                data: entity.data.unwrap_or_default().into(),
            })
        }
    };

    Ok(location)
}

fn text_location(record: &Value, location_type: LocationType) -> Result<String, LocationError> {
    entity::<TextLocationEntity>(record, location_type).map(|e| e.location)
}

fn entity<E: DeserializeOwned>(record: &Value, location_type: LocationType) -> Result<E, LocationError> {
    E::deserialize(record).map_err(|e| {
        warn!(location_type = %location_type, error = %e, "meeting_location_malformed");
        LocationError::Malformed {
            location_type: location_type.as_str().to_string(),
            message: e.to_string(),
        }
    })
}
