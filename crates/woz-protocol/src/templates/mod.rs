//! Scripted wizard replies filled from knowledge-base items.
//!
//! Each [`Intent`] has a reply template. Some templates mention details of
//! the selected knowledge-base item through `{placeholder}` slots; those
//! intents can only be filled when the item carries every field the slots
//! are bound to. `{{` and `}}` produce literal braces.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};
use tracing::debug;

const TEMPLATES_TARGET: &str = concat!(env!("CARGO_CRATE_NAME"), "::templates");

/// Intent of a scripted reply.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Intent {
    /// Greeting.
    Hello,
    /// Ask for the user's name.
    AskName,
    /// Ask where the ride should go.
    RideAskDestination,
    /// Ask where the ride should start.
    RideAskDeparture,
    /// Offer the selected ride for confirmation.
    RideAskConfirmBooking,
    /// Farewell.
    RideBye,
    /// Confirm the booked ride.
    RideConfirmBooking,
    /// Tell the user who drives.
    RideProvideDriverDetails,
    /// Tell the user about the ride.
    RideProvideRideDetails,
    /// Summarise the search criteria.
    RideInformSearchCriteria,
}

impl Intent {
    /// Returns the canonical snake case name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// Placeholder names and the knowledge-base fields they are bound to.
    #[must_use]
    pub const fn bindings(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::RideAskConfirmBooking => &[
                ("service_provider", "ServiceProvider"),
                ("departure_location", "DepartureLocation"),
                ("arrival_location", "ArrivalLocation"),
                ("price", "Price"),
                ("minutes_till_pickup", "MinutesTillPickup"),
            ],
            Self::RideConfirmBooking => &[
                ("car_model", "CarModel"),
                ("booking_id", "id"),
                ("license_plate", "LicensePlate"),
            ],
            Self::RideProvideDriverDetails => &[("driver_name", "DriverName")],
            Self::Hello
            | Self::AskName
            | Self::RideAskDestination
            | Self::RideAskDeparture
            | Self::RideBye
            | Self::RideProvideRideDetails
            | Self::RideInformSearchCriteria => &[],
        }
    }

    /// Knowledge-base fields the reply needs.
    pub fn required_fields(self) -> impl Iterator<Item = &'static str> {
        self.bindings().iter().map(|(_, field)| *field)
    }
}

/// Reply templates keyed by intent.
///
/// Deserializes from a JSON object mapping intent names to templates.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use woz_protocol::{Intent, ReplyTemplates};
///
/// let templates: ReplyTemplates = serde_json::from_value(json!({
///     "ride_provide_driver_details": "Your driver is {driver_name}.",
/// }))
/// .expect("templates");
/// let item = json!({"DriverName": "Ana"});
/// assert_eq!(
///     templates.fill(Intent::RideProvideDriverDetails, item.as_object()),
///     Some("Your driver is Ana.".to_owned()),
/// );
/// assert_eq!(templates.fill(Intent::RideProvideDriverDetails, None), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReplyTemplates {
    replies: BTreeMap<Intent, String>,
}

impl ReplyTemplates {
    /// Creates templates from an intent map.
    #[must_use]
    pub const fn new(replies: BTreeMap<Intent, String>) -> Self {
        Self { replies }
    }

    /// Returns the raw template for an intent.
    #[must_use]
    pub fn template(&self, intent: Intent) -> Option<&str> {
        self.replies.get(&intent).map(String::as_str)
    }

    /// Fills the reply for `intent` from a knowledge-base item.
    ///
    /// Intents without placeholders return their template verbatim and ignore
    /// the item. Returns `None` when the intent has no template, the item is
    /// absent or lacks a required field, or the template mentions a
    /// placeholder the intent does not bind.
    #[must_use]
    pub fn fill(&self, intent: Intent, kb_item: Option<&Map<String, Value>>) -> Option<String> {
        let template = self.replies.get(&intent)?;
        let bindings = intent.bindings();
        if bindings.is_empty() {
            return Some(template.clone());
        }
        let Some(item) = kb_item.filter(|item| {
            !item.is_empty() && intent.required_fields().all(|field| item.contains_key(field))
        }) else {
            debug!(
                target: TEMPLATES_TARGET,
                intent = intent.as_str(),
                "knowledge-base item lacks fields for reply"
            );
            return None;
        };
        render(template, |name| {
            bindings
                .iter()
                .find(|(placeholder, _)| *placeholder == name)
                .and_then(|(_, field)| item.get(*field))
                .map(display_value)
        })
    }
}

// Formats `{name}` slots; `None` on an unknown name or an unbalanced brace.
fn render(template: &str, lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '{' if chars.next_if_eq(&'{').is_some() => out.push('{'),
            '}' if chars.next_if_eq(&'}').is_some() => out.push('}'),
            '{' => {
                let mut name = String::new();
                loop {
                    match chars.next()? {
                        '}' => break,
                        c => name.push(c),
                    }
                }
                out.push_str(&lookup(&name)?);
            }
            '}' => return None,
            c => out.push(c),
        }
    }
    Some(out)
}

// Strings render bare; booleans and null use `True`, `False`, `None`.
fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Bool(true) => "True".to_owned(),
        Value::Bool(false) => "False".to_owned(),
        Value::Null => "None".to_owned(),
        other => other.to_string(),
    }
}
