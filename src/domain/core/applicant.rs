use derive_more::{Deref, Display, Error, From};
use serde::{Deserialize, Serialize};

use super::Gender;

/// Student number, the applicant's natural key. No generated ID exists.
#[derive(
    Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From, Deref, Default,
)]
pub struct StudentId(String);

impl From<&str> for StudentId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

pub const AGE_MIN: u32 = 15;
pub const AGE_MAX: u32 = 30;

/// Applicant profile. Upserted on every booking, never deleted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Applicant {
    student_id: StudentId,
    name: String,
    age: u32,
    gender: Gender,
    introduction: Option<String>,
}

impl Applicant {
    pub fn create(
        student_id: StudentId,
        name: String,
        age: u32,
        gender: Gender,
        introduction: Option<String>,
    ) -> Result<Self, ApplicantError> {
        Self::validate_student_id(&student_id)?;
        Self::validate_name(&name)?;
        Self::validate_age(age)?;
        Ok(Applicant {
            student_id,
            name,
            age,
            gender,
            introduction,
        })
    }

    pub fn student_id(&self) -> &StudentId {
        &self.student_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn gender(&self) -> Gender {
        self.gender
    }

    pub fn introduction(&self) -> Option<&str> {
        self.introduction.as_deref()
    }

    fn validate_student_id(student_id: &StudentId) -> Result<(), ApplicantError> {
        if student_id.trim().is_empty() {
            return Err(ApplicantError::StudentIdRequired);
        }
        Ok(())
    }

    fn validate_name(name: &str) -> Result<(), ApplicantError> {
        if name.trim().is_empty() {
            return Err(ApplicantError::NameRequired);
        }
        Ok(())
    }

    fn validate_age(age: u32) -> Result<(), ApplicantError> {
        if !(AGE_MIN..=AGE_MAX).contains(&age) {
            return Err(ApplicantError::AgeOutOfRange);
        }
        Ok(())
    }
}

#[derive(Error, Display, Debug, PartialEq, Eq)]
pub enum ApplicantError {
    #[display(fmt = "Student ID is not specified")]
    StudentIdRequired,
    #[display(fmt = "Name is not specified")]
    NameRequired,
    #[display(fmt = "Age is out of range")]
    AgeOutOfRange,
}
