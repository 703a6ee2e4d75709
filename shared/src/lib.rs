use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Locale assigned to a freshly created profile
pub const DEFAULT_LOCALE: &str = "en_US";
/// Name used when onboarding does not supply one
pub const DEFAULT_PROFILE_NAME: &str = "User";
pub const DEFAULT_CURRENCY: &str = "USD";
pub const DEFAULT_INVENTORY_UNIT: &str = "kg";
/// Energy density assumed for food when neither pet nor profile overrides it
pub const DEFAULT_FOOD_KCAL_PER_100G: f64 = 350.0;
pub const DEFAULT_LITTER_REMINDER_HOUR: u32 = 20;
pub const DEFAULT_LITTER_REMINDER_MINUTE: u32 = 0;
pub const DEFAULT_LITTER_THRESHOLD_DAYS: u32 = 3;
/// Length of the free trial counted from the trial start date
pub const TRIAL_LENGTH_MONTHS: u32 = 1;

/// Kind of care event.
///
/// The serde representation (and [`CareEventType::tag`]) is the stable value
/// written to storage. [`CareEventType::label`] is for display only and may
/// change without touching persisted data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CareEventType {
    Feeding,
    Litter,
    Walk,
    Vet,
    Vaccine,
    Playing,
    Custom,
}

impl CareEventType {
    pub const ALL: [CareEventType; 7] = [
        CareEventType::Feeding,
        CareEventType::Litter,
        CareEventType::Walk,
        CareEventType::Vet,
        CareEventType::Vaccine,
        CareEventType::Playing,
        CareEventType::Custom,
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            CareEventType::Feeding => "feeding",
            CareEventType::Litter => "litter",
            CareEventType::Walk => "walk",
            CareEventType::Vet => "vet",
            CareEventType::Vaccine => "vaccine",
            CareEventType::Playing => "playing",
            CareEventType::Custom => "custom",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.tag() == tag)
    }

    pub fn label(&self) -> &'static str {
        match self {
            CareEventType::Feeding => "Feeding",
            CareEventType::Litter => "Litter Cleaning",
            CareEventType::Walk => "Walk",
            CareEventType::Vet => "Vet Visit",
            CareEventType::Vaccine => "Vaccine",
            CareEventType::Playing => "Playing",
            CareEventType::Custom => "Custom",
        }
    }

    /// Icon key understood by the presentation layer
    pub fn icon(&self) -> &'static str {
        match self {
            CareEventType::Feeding => "fish.fill",
            CareEventType::Litter => "tree.fill",
            CareEventType::Walk => "dog.fill",
            CareEventType::Vet => "heart.text.clipboard.fill",
            CareEventType::Vaccine => "cross.case.fill",
            CareEventType::Playing => "figure.play",
            CareEventType::Custom => "star.fill",
        }
    }
}

impl fmt::Display for CareEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Category shared by expenses and necessity items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseCategory {
    Food,
    Litter,
    Vet,
    Other,
}

impl ExpenseCategory {
    pub const ALL: [ExpenseCategory; 4] = [
        ExpenseCategory::Food,
        ExpenseCategory::Litter,
        ExpenseCategory::Vet,
        ExpenseCategory::Other,
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            ExpenseCategory::Food => "food",
            ExpenseCategory::Litter => "litter",
            ExpenseCategory::Vet => "vet",
            ExpenseCategory::Other => "other",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.tag() == tag)
    }

    pub fn label(&self) -> &'static str {
        match self {
            ExpenseCategory::Food => "Food",
            ExpenseCategory::Litter => "Litter",
            ExpenseCategory::Vet => "Vet",
            ExpenseCategory::Other => "Other",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            ExpenseCategory::Food => "fish.fill",
            ExpenseCategory::Litter => "tree.fill",
            ExpenseCategory::Vet => "cross.case.fill",
            ExpenseCategory::Other => "tag",
        }
    }
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InventoryType {
    Food,
    Litter,
    Other,
}

impl InventoryType {
    pub const ALL: [InventoryType; 3] = [InventoryType::Food, InventoryType::Litter, InventoryType::Other];

    pub fn tag(&self) -> &'static str {
        match self {
            InventoryType::Food => "food",
            InventoryType::Litter => "litter",
            InventoryType::Other => "other",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.tag() == tag)
    }

    pub fn label(&self) -> &'static str {
        match self {
            InventoryType::Food => "Food",
            InventoryType::Litter => "Litter",
            InventoryType::Other => "Other",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            InventoryType::Food => "fish.fill",
            InventoryType::Litter => "tree.fill",
            InventoryType::Other => "cube.box",
        }
    }
}

impl fmt::Display for InventoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Feeding-only payload of a care event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedingDetails {
    /// None when not recorded, true for special food, false for ordinary
    pub is_special_food: Option<bool>,
    pub food_grams: Option<f64>,
    /// Flavor name, e.g. "Salmon"
    pub food_flavor: Option<String>,
}

/// What happened in a care event, with the payload that only that kind carries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CareEventKind {
    Feeding(FeedingDetails),
    Litter,
    Walk { duration_minutes: Option<u32> },
    Vet,
    Vaccine,
    Playing,
    Custom,
}

impl CareEventKind {
    /// The variant for `event_type` with an empty payload
    pub fn bare(event_type: CareEventType) -> Self {
        match event_type {
            CareEventType::Feeding => CareEventKind::Feeding(FeedingDetails::default()),
            CareEventType::Litter => CareEventKind::Litter,
            CareEventType::Walk => CareEventKind::Walk { duration_minutes: None },
            CareEventType::Vet => CareEventKind::Vet,
            CareEventType::Vaccine => CareEventKind::Vaccine,
            CareEventType::Playing => CareEventKind::Playing,
            CareEventType::Custom => CareEventKind::Custom,
        }
    }

    pub fn event_type(&self) -> CareEventType {
        match self {
            CareEventKind::Feeding(_) => CareEventType::Feeding,
            CareEventKind::Litter => CareEventType::Litter,
            CareEventKind::Walk { .. } => CareEventType::Walk,
            CareEventKind::Vet => CareEventType::Vet,
            CareEventKind::Vaccine => CareEventType::Vaccine,
            CareEventKind::Playing => CareEventType::Playing,
            CareEventKind::Custom => CareEventType::Custom,
        }
    }

    pub fn feeding(&self) -> Option<&FeedingDetails> {
        match self {
            CareEventKind::Feeding(details) => Some(details),
            _ => None,
        }
    }
}

/// A single logged care event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CareEvent {
    pub id: Uuid,
    /// Owning pet, if any
    pub pet_id: Option<Uuid>,
    pub kind: CareEventKind,
    pub date: DateTime<Utc>,
    pub notes: String,
    /// Free-form JSON for extra data
    pub metadata: Option<String>,
}

impl CareEvent {
    pub fn new(kind: CareEventKind, date: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            pet_id: None,
            kind,
            date,
            notes: String::new(),
            metadata: None,
        }
    }

    pub fn for_pet(mut self, pet_id: Uuid) -> Self {
        self.pet_id = Some(pet_id);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn event_type(&self) -> CareEventType {
        self.kind.event_type()
    }

    /// Grams logged by a feeding event, None for every other kind
    pub fn food_grams(&self) -> Option<f64> {
        self.kind.feeding().and_then(|f| f.food_grams)
    }

    /// One-line feeding description such as "Special • 80g • Salmon"
    pub fn feeding_summary(&self) -> Option<String> {
        let details = self.kind.feeding()?;
        let mut parts = Vec::new();

        if let Some(is_special) = details.is_special_food {
            parts.push(if is_special { "Special".to_string() } else { "Ordinary".to_string() });
        }
        if let Some(grams) = details.food_grams {
            parts.push(format!("{}g", grams.trunc() as i64));
        }
        if let Some(flavor) = details.food_flavor.as_ref().filter(|f| !f.is_empty()) {
            parts.push(flavor.clone());
        }

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" • "))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pet {
    pub id: Uuid,
    pub name: String,
    /// Free text such as "Cat" or "Dog"
    pub species: String,
    pub birth_date: Option<NaiveDate>,
    pub photo_data: Option<Vec<u8>>,
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub last_litter_reminder_sent_at: Option<DateTime<Utc>>,
    /// Calendar day (host local time) the last litter reminder was scheduled on
    pub last_litter_reminder_sent_on: Option<NaiveDate>,
    /// Per-pet override of the profile's default food energy density
    pub food_kcal_per_100g: Option<f64>,
}

impl Pet {
    pub fn new(name: impl Into<String>, species: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            species: species.into(),
            birth_date: None,
            photo_data: None,
            weight_kg: None,
            height_cm: None,
            created_at,
            last_litter_reminder_sent_at: None,
            last_litter_reminder_sent_on: None,
            food_kcal_per_100g: None,
        }
    }

    pub fn with_weight(mut self, weight_kg: f64) -> Self {
        self.weight_kg = Some(weight_kg);
        self
    }

    pub fn record_litter_reminder(&mut self, sent_at: DateTime<Utc>, sent_on: NaiveDate) {
        self.last_litter_reminder_sent_at = Some(sent_at);
        self.last_litter_reminder_sent_on = Some(sent_on);
    }

    /// Human readable age ("2 years", "3 months", "Newborn")
    pub fn age_label(&self, today: NaiveDate) -> Option<String> {
        let birth = self.birth_date?;
        let mut months = (today.year() - birth.year()) * 12 + today.month() as i32 - birth.month() as i32;
        if today.day() < birth.day() {
            months -= 1;
        }

        let years = months / 12;
        let label = if years > 0 {
            format!("{} year{}", years, if years > 1 { "s" } else { "" })
        } else if months > 0 {
            format!("{} month{}", months, if months > 1 { "s" } else { "" })
        } else {
            "Newborn".to_string()
        };
        Some(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    /// None for household expenses
    pub pet_id: Option<Uuid>,
    pub amount: f64,
    /// ISO currency code
    pub currency: String,
    pub category: ExpenseCategory,
    pub date: DateTime<Utc>,
    pub notes: String,
    pub linked_event_id: Option<Uuid>,
}

impl Expense {
    pub fn new(amount: f64, category: ExpenseCategory, date: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            pet_id: None,
            amount,
            currency: DEFAULT_CURRENCY.to_string(),
            category,
            date,
            notes: String::new(),
            linked_event_id: None,
        }
    }

    pub fn for_pet(mut self, pet_id: Uuid) -> Self {
        self.pet_id = Some(pet_id);
        self
    }

    pub fn is_household(&self) -> bool {
        self.pet_id.is_none()
    }

    pub fn formatted_amount(&self) -> String {
        format!("{} {:.2}", self.currency, self.amount)
    }
}

/// Something to buy or do, optionally tied to a pet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NecessityItem {
    pub id: Uuid,
    pub pet_id: Option<Uuid>,
    pub title: String,
    pub category: ExpenseCategory,
    pub is_done: bool,
    pub created_at: DateTime<Utc>,
    pub due_date: Option<DateTime<Utc>>,
    pub linked_expense_id: Option<Uuid>,
}

impl NecessityItem {
    pub fn new(title: impl Into<String>, category: ExpenseCategory, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            pet_id: None,
            title: title.into(),
            category,
            is_done: false,
            created_at,
            due_date: None,
            linked_expense_id: None,
        }
    }

    pub fn for_pet(mut self, pet_id: Uuid) -> Self {
        self.pet_id = Some(pet_id);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: Uuid,
    pub item_type: InventoryType,
    pub name: String,
    pub quantity: f64,
    /// "kg", "lbs", "bags", ...
    pub unit: String,
    pub updated_at: DateTime<Utc>,
}

impl InventoryItem {
    pub fn new(item_type: InventoryType, name: impl Into<String>, quantity: f64, updated_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            item_type,
            name: name.into(),
            quantity,
            unit: DEFAULT_INVENTORY_UNIT.to_string(),
            updated_at,
        }
    }

    pub fn formatted_quantity(&self) -> String {
        format!("{:.1} {}", self.quantity, self.unit)
    }
}

/// The single owner profile of the app
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub trial_start_date: Option<DateTime<Utc>>,
    pub is_premium: bool,
    pub premium_expires_at: Option<DateTime<Utc>>,
    pub locale: String,
    pub notifications_enabled: bool,
    pub litter_reminders_enabled: bool,
    pub litter_reminder_hour: u32,
    pub litter_reminder_minute: u32,
    pub litter_reminder_threshold_days: u32,
    pub playful_emoji_enabled: bool,
    pub default_food_kcal_per_100g: f64,
}

impl UserProfile {
    /// New profile whose trial starts at `created_at`
    pub fn new(name: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            created_at,
            trial_start_date: Some(created_at),
            is_premium: false,
            premium_expires_at: None,
            locale: DEFAULT_LOCALE.to_string(),
            notifications_enabled: false,
            litter_reminders_enabled: false,
            litter_reminder_hour: DEFAULT_LITTER_REMINDER_HOUR,
            litter_reminder_minute: DEFAULT_LITTER_REMINDER_MINUTE,
            litter_reminder_threshold_days: DEFAULT_LITTER_THRESHOLD_DAYS,
            playful_emoji_enabled: true,
            default_food_kcal_per_100g: DEFAULT_FOOD_KCAL_PER_100G,
        }
    }

    /// End of the trial window (exclusive)
    pub fn trial_ends_at(&self) -> Option<DateTime<Utc>> {
        self.trial_start_date
            .and_then(|start| start.checked_add_months(Months::new(TRIAL_LENGTH_MONTHS)))
    }

    pub fn is_trial_active(&self, now: DateTime<Utc>) -> bool {
        match self.trial_ends_at() {
            Some(end) => now < end && !self.is_premium,
            None => false,
        }
    }

    pub fn can_access_premium_features(&self, now: DateTime<Utc>) -> bool {
        self.is_premium || self.is_trial_active(now)
    }
}

/// Closed time interval, both bounds inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: &DateTime<Utc>) -> bool {
        self.start <= *date && *date <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_tags_are_stable_and_distinct_from_labels() {
        assert_eq!(CareEventType::Litter.tag(), "litter");
        assert_eq!(CareEventType::Litter.label(), "Litter Cleaning");
        assert_eq!(CareEventType::from_tag("vet"), Some(CareEventType::Vet));
        assert_eq!(CareEventType::from_tag("Vet Visit"), None);
        assert_eq!(ExpenseCategory::from_tag("other"), Some(ExpenseCategory::Other));
        assert_eq!(InventoryType::Other.icon(), "cube.box");
        assert_eq!(
            serde_json::to_string(&CareEventType::Playing).unwrap(),
            "\"playing\""
        );
    }

    #[test]
    fn test_kind_carries_only_its_payload() {
        let walk = CareEventKind::Walk { duration_minutes: Some(25) };
        assert_eq!(walk.event_type(), CareEventType::Walk);
        assert!(walk.feeding().is_none());

        for event_type in CareEventType::ALL {
            assert_eq!(CareEventKind::bare(event_type).event_type(), event_type);
        }

        let json = serde_json::to_value(&walk).unwrap();
        assert_eq!(json["type"], "walk");
        assert_eq!(json["duration_minutes"], 25);
    }

    #[test]
    fn test_feeding_summary() {
        let event = CareEvent::new(
            CareEventKind::Feeding(FeedingDetails {
                is_special_food: Some(true),
                food_grams: Some(80.6),
                food_flavor: Some("Salmon".to_string()),
            }),
            at(2026, 1, 5),
        );
        assert_eq!(event.feeding_summary().as_deref(), Some("Special • 80g • Salmon"));
        assert_eq!(event.food_grams(), Some(80.6));

        let bare = CareEvent::new(CareEventKind::bare(CareEventType::Feeding), at(2026, 1, 5));
        assert_eq!(bare.feeding_summary(), None);

        let litter = CareEvent::new(CareEventKind::Litter, at(2026, 1, 5));
        assert_eq!(litter.feeding_summary(), None);
        assert_eq!(litter.food_grams(), None);
    }

    #[test]
    fn test_profile_defaults_and_trial_start() {
        let created = at(2026, 1, 10);
        let profile = UserProfile::new("User", created);

        assert_eq!(profile.trial_start_date, Some(created));
        assert_eq!(profile.litter_reminder_hour, 20);
        assert_eq!(profile.litter_reminder_threshold_days, 3);
        assert_eq!(profile.default_food_kcal_per_100g, 350.0);
        assert!(!profile.litter_reminders_enabled);
        assert!(profile.playful_emoji_enabled);
    }

    #[test]
    fn test_trial_ends_exactly_one_month_after_start() {
        let start = at(2026, 1, 31);
        let profile = UserProfile::new("User", start);
        let end = profile.trial_ends_at().unwrap();

        // Month arithmetic clamps to the last day of February
        assert_eq!(end, at(2026, 2, 28));
        assert!(profile.is_trial_active(end - Duration::nanoseconds(1)));
        assert!(!profile.is_trial_active(end));
        assert!(!profile.can_access_premium_features(end));
    }

    #[test]
    fn test_premium_disables_trial_but_grants_access() {
        let now = at(2026, 3, 1);
        let mut profile = UserProfile::new("User", now);
        assert!(profile.is_trial_active(now));

        profile.is_premium = true;
        assert!(!profile.is_trial_active(now));
        assert!(profile.can_access_premium_features(now));

        profile.trial_start_date = None;
        profile.is_premium = false;
        assert!(!profile.can_access_premium_features(now));
    }

    #[test]
    fn test_age_label() {
        let mut pet = Pet::new("Miso", "Cat", at(2026, 1, 1));
        let today = NaiveDate::from_ymd_opt(2026, 6, 15).unwrap();
        assert_eq!(pet.age_label(today), None);

        pet.birth_date = NaiveDate::from_ymd_opt(2024, 6, 15);
        assert_eq!(pet.age_label(today).as_deref(), Some("2 years"));

        pet.birth_date = NaiveDate::from_ymd_opt(2025, 6, 16);
        assert_eq!(pet.age_label(today).as_deref(), Some("11 months"));

        pet.birth_date = NaiveDate::from_ymd_opt(2026, 5, 15);
        assert_eq!(pet.age_label(today).as_deref(), Some("1 month"));

        pet.birth_date = NaiveDate::from_ymd_opt(2026, 6, 1);
        assert_eq!(pet.age_label(today).as_deref(), Some("Newborn"));
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let range = DateRange::new(at(2026, 1, 1), at(2026, 1, 31));
        assert!(range.contains(&at(2026, 1, 1)));
        assert!(range.contains(&at(2026, 1, 31)));
        assert!(!range.contains(&(at(2026, 1, 31) + Duration::seconds(1))));
    }

    #[test]
    fn test_formatting_helpers() {
        let item = InventoryItem::new(InventoryType::Litter, "Clumping litter", 2.5, at(2026, 1, 1));
        assert_eq!(item.formatted_quantity(), "2.5 kg");

        let expense = Expense::new(12.5, ExpenseCategory::Vet, at(2026, 1, 1));
        assert_eq!(expense.formatted_amount(), "USD 12.50");
        assert!(expense.is_household());
    }
}
