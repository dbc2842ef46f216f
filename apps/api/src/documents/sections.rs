use serde::{Deserialize, Serialize};

use crate::documents::{new_id, DocumentStore};
use crate::models::cv::{
    CvDocument, Education, EducationPatch, Experience, ExperiencePatch, PersonalInfo, Skill,
    SkillPatch,
};

/// One field-level edit of the live CV.
///
/// Structured sections are replaced wholesale; list sections take add /
/// update (partial merge) / remove. No content validation happens here.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum CvUpdate {
    PersonalInfo { value: PersonalInfo },
    Summary { value: String },
    Languages { value: Vec<String> },
    Certifications { value: Vec<String> },
    Template { value: String },
    AddExperience { value: Experience },
    UpdateExperience { id: String, value: ExperiencePatch },
    RemoveExperience { id: String },
    AddEducation { value: Education },
    UpdateEducation { id: String, value: EducationPatch },
    RemoveEducation { id: String },
    AddSkill { value: Skill },
    UpdateSkill { id: String, value: SkillPatch },
    RemoveSkill { id: String },
}

/// Result of an edit. `applied` is false when an update/remove named an entry
/// that does not exist; the modification time is refreshed either way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldOutcome {
    pub applied: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_id: Option<String>,
}

impl FieldOutcome {
    fn applied() -> Self {
        Self {
            applied: true,
            entry_id: None,
        }
    }

    fn entry(id: String, applied: bool) -> Self {
        Self {
            applied,
            entry_id: Some(id),
        }
    }
}

/// An entry of a CV list section.
trait SectionEntry {
    const ID_PREFIX: &'static str;
    type Patch;

    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);
    fn merge(&mut self, patch: Self::Patch);
    /// Restores entry invariants after an add or merge.
    fn normalize(&mut self) {}
}

impl SectionEntry for Experience {
    const ID_PREFIX: &'static str = "exp";
    type Patch = ExperiencePatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn merge(&mut self, patch: ExperiencePatch) {
        if let Some(company) = patch.company {
            self.company = company;
        }
        if let Some(position) = patch.position {
            self.position = position;
        }
        if let Some(start_date) = patch.start_date {
            self.start_date = start_date;
        }
        if let Some(end_date) = patch.end_date {
            self.end_date = Some(end_date);
        }
        if let Some(current) = patch.current {
            self.current = current;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(technologies) = patch.technologies {
            self.technologies = technologies;
        }
    }

    // A current position has no end date.
    fn normalize(&mut self) {
        if self.current {
            self.end_date = None;
        }
    }
}

impl SectionEntry for Education {
    const ID_PREFIX: &'static str = "edu";
    type Patch = EducationPatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn merge(&mut self, patch: EducationPatch) {
        if let Some(institution) = patch.institution {
            self.institution = institution;
        }
        if let Some(degree) = patch.degree {
            self.degree = degree;
        }
        if let Some(field) = patch.field {
            self.field = field;
        }
        if let Some(start_date) = patch.start_date {
            self.start_date = start_date;
        }
        if let Some(end_date) = patch.end_date {
            self.end_date = Some(end_date);
        }
        if let Some(current) = patch.current {
            self.current = current;
        }
        if let Some(description) = patch.description {
            self.description = Some(description);
        }
    }

    fn normalize(&mut self) {
        if self.current {
            self.end_date = None;
        }
    }
}

impl SectionEntry for Skill {
    const ID_PREFIX: &'static str = "skill";
    type Patch = SkillPatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn merge(&mut self, patch: SkillPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(level) = patch.level {
            self.level = level;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
    }
}

fn add_entry<E: SectionEntry>(entries: &mut Vec<E>, mut entry: E) -> FieldOutcome {
    // Ids only need to be unique within the list they belong to.
    if entry.id().is_empty() || entries.iter().any(|e| e.id() == entry.id()) {
        entry.set_id(new_id(E::ID_PREFIX));
    }
    entry.normalize();
    let id = entry.id().to_string();
    entries.push(entry);
    FieldOutcome::entry(id, true)
}

fn update_entry<E: SectionEntry>(entries: &mut [E], id: String, patch: E::Patch) -> FieldOutcome {
    match entries.iter_mut().find(|e| e.id() == id) {
        Some(entry) => {
            entry.merge(patch);
            entry.normalize();
            FieldOutcome::entry(id, true)
        }
        None => FieldOutcome::entry(id, false),
    }
}

fn remove_entry<E: SectionEntry>(entries: &mut Vec<E>, id: String) -> FieldOutcome {
    let before = entries.len();
    entries.retain(|e| e.id() != id);
    let applied = entries.len() != before;
    FieldOutcome::entry(id, applied)
}

impl DocumentStore<CvDocument> {
    /// Applies one section edit to the live CV and refreshes `last_modified`.
    pub fn update_field(&mut self, update: CvUpdate) -> FieldOutcome {
        self.modify(|doc| match update {
            CvUpdate::PersonalInfo { value } => {
                doc.personal_info = value;
                FieldOutcome::applied()
            }
            CvUpdate::Summary { value } => {
                doc.summary = value;
                FieldOutcome::applied()
            }
            CvUpdate::Languages { value } => {
                doc.languages = value;
                FieldOutcome::applied()
            }
            CvUpdate::Certifications { value } => {
                doc.certifications = value;
                FieldOutcome::applied()
            }
            CvUpdate::Template { value } => {
                doc.template = value;
                FieldOutcome::applied()
            }
            CvUpdate::AddExperience { value } => add_entry(&mut doc.experiences, value),
            CvUpdate::UpdateExperience { id, value } => {
                update_entry(&mut doc.experiences, id, value)
            }
            CvUpdate::RemoveExperience { id } => remove_entry(&mut doc.experiences, id),
            CvUpdate::AddEducation { value } => add_entry(&mut doc.education, value),
            CvUpdate::UpdateEducation { id, value } => update_entry(&mut doc.education, id, value),
            CvUpdate::RemoveEducation { id } => remove_entry(&mut doc.education, id),
            CvUpdate::AddSkill { value } => add_entry(&mut doc.skills, value),
            CvUpdate::UpdateSkill { id, value } => update_entry(&mut doc.skills, id, value),
            CvUpdate::RemoveSkill { id } => remove_entry(&mut doc.skills, id),
        })
    }
}
