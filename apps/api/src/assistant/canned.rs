use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::assistant::{Assistant, Suggestion, SuggestionKind, SuggestionRequest};
use crate::errors::AppError;

/// Largest accepted latency multiplier.
pub const MAX_LATENCY_SCALE: f64 = 100.0;

/// Canned suggestions with artificial latency.
///
/// `latency_scale` multiplies the per-kind delay; 0.0 answers immediately.
#[derive(Debug, Clone)]
pub struct CannedAssistant {
    latency_scale: f64,
}

impl CannedAssistant {
    pub fn new(latency_scale: f64) -> Self {
        Self {
            latency_scale: if latency_scale.is_finite() {
                latency_scale.clamp(0.0, MAX_LATENCY_SCALE)
            } else {
                0.0
            },
        }
    }

    fn base_latency(kind: SuggestionKind) -> Duration {
        match kind {
            SuggestionKind::Summary => Duration::from_millis(1500),
            SuggestionKind::Skill => Duration::from_millis(1200),
            SuggestionKind::Experience => Duration::from_millis(1000),
            SuggestionKind::CoverLetter => Duration::from_millis(2000),
        }
    }
}

#[async_trait]
impl Assistant for CannedAssistant {
    async fn suggest(&self, request: &SuggestionRequest) -> Result<Suggestion, AppError> {
        let delay = Self::base_latency(request.kind()).mul_f64(self.latency_scale);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        debug!("Canned {:?} suggestion after {}ms", request.kind(), delay.as_millis());

        Ok(match request {
            SuggestionRequest::Summary {
                experiences,
                skills,
            } => summary(experiences, skills),
            SuggestionRequest::Skill {
                industry,
                experience_level,
            } => skills_for(
                industry.as_deref().unwrap_or("Technology"),
                experience_level.as_deref().unwrap_or("intermediate"),
            ),
            SuggestionRequest::Experience {
                current_description,
            } => experience(current_description.as_deref().unwrap_or_default()),
            SuggestionRequest::CoverLetter {
                cv_content,
                job_description,
                company,
            } => cover_letter(
                cv_content.as_deref().unwrap_or_default(),
                job_description.as_deref().unwrap_or_default(),
                company.as_deref().unwrap_or("your company"),
            ),
        })
    }
}

fn summary(experiences: &[String], skills: &[String]) -> Suggestion {
    let exp = if experiences.is_empty() {
        "web development".to_string()
    } else {
        experiences.join(", ")
    };
    let skills = if skills.is_empty() {
        "modern technologies".to_string()
    } else {
        skills.join(", ")
    };

    Suggestion {
        kind: SuggestionKind::Summary,
        content: format!(
            "Full-stack developer with solid experience in {exp}. Expertise in {skills}. \
             Has delivered technical projects end to end and is looking for a challenging role."
        ),
        confidence: 0.85,
        alternatives: vec![
            format!(
                "Specialist in {exp} with deep command of {skills}. \
                 Strong record designing innovative solutions and leading projects."
            ),
            format!(
                "Software professional focused on {exp}. \
                 Advanced skills in {skills} and a taste for hard technical problems."
            ),
        ],
    }
}

fn skills_for(industry: &str, level: &str) -> Suggestion {
    let base = match level {
        "beginner" => "React (Intermediate), JavaScript (Intermediate), HTML/CSS (Advanced), Git (Intermediate), Problem solving (Intermediate)",
        "senior" => "React (Expert), Node.js (Advanced), TypeScript (Advanced), AWS (Intermediate), Docker (Intermediate), Architecture (Advanced), Leadership (Intermediate)",
        "expert" => "React (Expert), Node.js (Expert), TypeScript (Expert), AWS (Advanced), Docker (Advanced), Architecture (Expert), Leadership (Advanced), Management (Intermediate)",
        _ => "React (Advanced), Node.js (Intermediate), TypeScript (Intermediate), MongoDB (Intermediate), Git (Advanced), Agile (Intermediate)",
    };
    let industry_specific = match industry {
        "Technology" => Some("Cloud Computing, DevOps, CI/CD, Microservices"),
        "Finance" => Some("Blockchain, FinTech, Security, Regulation"),
        "Healthcare" => Some("Medical systems, Health data, GDPR, Interoperability"),
        "E-commerce" => Some("Online payments, Logistics, Analytics, UX/UI"),
        _ => None,
    };

    Suggestion {
        kind: SuggestionKind::Skill,
        content: match industry_specific {
            Some(extra) => format!("{base}, {extra}"),
            None => base.to_string(),
        },
        confidence: 0.90,
        alternatives: Vec::new(),
    }
}

fn experience(current: &str) -> Suggestion {
    let base = if current.trim().is_empty() {
        "Built and maintained web applications"
    } else {
        current.trim_end_matches('.')
    };
    Suggestion {
        kind: SuggestionKind::Experience,
        content: format!("{base}. Results: faster page loads and streamlined delivery processes."),
        confidence: 0.75,
        alternatives: Vec::new(),
    }
}

fn cover_letter(cv_content: &str, job_description: &str, company: &str) -> Suggestion {
    let cv_preview = preview(cv_content, 200)
        .unwrap_or("Experience in software development and solid technical skills");
    let job_preview = preview(job_description, 100).unwrap_or("your innovative projects");

    Suggestion {
        kind: SuggestionKind::CoverLetter,
        content: format!(
            "Dear Hiring Manager,\n\n\
             I am writing to apply for a position at {company}.\n\n\
             {cv_preview}...\n\n\
             I am interested in {job_preview} and would be glad to contribute to your work.\n\n\
             Sincerely,\n\
             [Your Name]"
        ),
        confidence: 0.80,
        alternatives: Vec::new(),
    }
}

/// First `max_chars` characters, or `None` for blank input.
fn preview(text: &str, max_chars: usize) -> Option<&str> {
    if text.trim().is_empty() {
        return None;
    }
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => Some(&text[..end]),
        None => Some(text),
    }
}
