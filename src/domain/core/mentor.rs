use chrono::NaiveDate;
use derive_more::{Deref, Display, Error, From};
use serde::{Deserialize, Serialize};

use super::SlotTime;

/// Mentor ID. Opaque, minted by the remote store (`mentor_<millis>`).
#[derive(
    Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From, Deref, Default,
)]
pub struct MentorId(String);

impl From<&str> for MentorId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
}

/// The published times for one calendar date.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySlots {
    pub date: NaiveDate,
    pub times: Vec<SlotTime>,
}

/// Mentor entity. Created, edited and deleted through admin operations only;
/// edits never reach back into reservations already made against a slot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mentor {
    id: MentorId,
    name: String,
    role: String,
    introduction: String,
    photo: Option<String>,
    gender: Gender,
    available_slots: Vec<DaySlots>,
}

impl Mentor {
    pub fn create(id: MentorId, profile: NewMentor) -> Result<Self, MentorError> {
        Self::validate_profile(&profile)?;
        let mut entity = Mentor {
            id,
            name: profile.name,
            role: profile.role,
            introduction: profile.introduction,
            photo: profile.photo,
            gender: profile.gender,
            available_slots: profile.available_slots,
        };
        entity.normalize_slots();
        Ok(entity)
    }

    /// Full-replace edit, the only update path the admin surface uses.
    pub fn update(&mut self, profile: NewMentor) -> Result<(), MentorError> {
        Self::validate_profile(&profile)?;
        self.name = profile.name;
        self.role = profile.role;
        self.introduction = profile.introduction;
        self.photo = profile.photo;
        self.gender = profile.gender;
        self.available_slots = profile.available_slots;
        self.normalize_slots();
        Ok(())
    }

    pub fn id(&self) -> &MentorId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn introduction(&self) -> &str {
        &self.introduction
    }

    pub fn photo(&self) -> Option<&str> {
        self.photo.as_deref()
    }

    pub fn gender(&self) -> Gender {
        self.gender
    }

    pub fn available_slots(&self) -> &[DaySlots] {
        &self.available_slots
    }

    fn normalize_slots(&mut self) {
        self.available_slots.sort_by_key(|s| s.date);
        for day in &mut self.available_slots {
            day.times.sort();
        }
    }

    fn validate_profile(profile: &NewMentor) -> Result<(), MentorError> {
        Self::validate_name(&profile.name)?;
        Self::validate_role(&profile.role)?;
        Self::validate_slots(&profile.available_slots)?;
        Ok(())
    }

    fn validate_name(name: &str) -> Result<(), MentorError> {
        if name.trim().is_empty() {
            return Err(MentorError::NameRequired);
        }
        Ok(())
    }

    fn validate_role(role: &str) -> Result<(), MentorError> {
        if role.trim().is_empty() {
            return Err(MentorError::RoleRequired);
        }
        Ok(())
    }

    fn validate_slots(slots: &[DaySlots]) -> Result<(), MentorError> {
        for (i, day) in slots.iter().enumerate() {
            if slots[..i].iter().any(|d| d.date == day.date) {
                return Err(MentorError::DuplicateSlotDate);
            }
            for (j, time) in day.times.iter().enumerate() {
                if day.times[..j].contains(time) {
                    return Err(MentorError::DuplicateSlotTime);
                }
            }
        }
        Ok(())
    }
}

/// Admin payload for creating a mentor; the remote store assigns the ID.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMentor {
    pub name: String,
    pub role: String,
    pub introduction: String,
    pub photo: Option<String>,
    pub gender: Gender,
    pub available_slots: Vec<DaySlots>,
}

#[derive(Error, Display, Debug, PartialEq, Eq)]
pub enum MentorError {
    #[display(fmt = "Name is not specified")]
    NameRequired,
    #[display(fmt = "Role is not specified")]
    RoleRequired,
    #[display(fmt = "Duplicate slot date")]
    DuplicateSlotDate,
    #[display(fmt = "Duplicate time within a slot date")]
    DuplicateSlotTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> NewMentor {
        NewMentor {
            name: "Kim".to_owned(),
            role: "Leader".to_owned(),
            introduction: "Hi".to_owned(),
            photo: None,
            gender: Gender::Female,
            available_slots: vec![DaySlots {
                date: NaiveDate::from_ymd_opt(2026, 2, 23).unwrap(),
                times: vec![SlotTime::new(10, 0).unwrap(), SlotTime::new(9, 30).unwrap()],
            }],
        }
    }

    #[test]
    fn create_sorts_slot_times() {
        let mentor = Mentor::create("mentor_1".into(), profile()).unwrap();
        let times = &mentor.available_slots()[0].times;
        assert_eq!(times[0], SlotTime::new(9, 30).unwrap());
        assert_eq!(times[1], SlotTime::new(10, 0).unwrap());
    }

    #[test]
    fn create_requires_name_and_role() {
        let mut blank_name = profile();
        blank_name.name = "  ".to_owned();
        assert_eq!(
            Mentor::create("mentor_1".into(), blank_name).unwrap_err(),
            MentorError::NameRequired
        );

        let mut blank_role = profile();
        blank_role.role = String::new();
        assert_eq!(
            Mentor::create("mentor_1".into(), blank_role).unwrap_err(),
            MentorError::RoleRequired
        );
    }

    #[test]
    fn create_rejects_duplicate_dates_and_times() {
        let mut dup_date = profile();
        let day = dup_date.available_slots[0].clone();
        dup_date.available_slots.push(day);
        assert_eq!(
            Mentor::create("mentor_1".into(), dup_date).unwrap_err(),
            MentorError::DuplicateSlotDate
        );

        let mut dup_time = profile();
        dup_time.available_slots[0]
            .times
            .push(SlotTime::new(9, 30).unwrap());
        assert_eq!(
            Mentor::create("mentor_1".into(), dup_time).unwrap_err(),
            MentorError::DuplicateSlotTime
        );
    }

    #[test]
    fn update_replaces_profile() {
        let mut mentor = Mentor::create("mentor_1".into(), profile()).unwrap();
        let mut edited = profile();
        edited.role = "Staff".to_owned();
        edited.available_slots.clear();
        mentor.update(edited).unwrap();
        assert_eq!(mentor.role(), "Staff");
        assert!(mentor.available_slots().is_empty());
        assert_eq!(mentor.id(), &MentorId::from("mentor_1"));
    }
}
