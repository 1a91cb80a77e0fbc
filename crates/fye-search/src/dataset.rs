//! Synthetic resume dataset
//!
//! Generates reproducible demo resumes from fixed vocabularies and
//! reads/writes them as a JSON array.

use fye_core::{FyeError, Result, Resume};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::path::Path;

const JOB_TITLES: &[&str] = &[
    "Software Engineer",
    "Data Scientist",
    "Product Manager",
    "DevOps Engineer",
    "Frontend Developer",
    "Backend Developer",
    "Full Stack Developer",
    "UI/UX Designer",
    "Machine Learning Engineer",
    "Data Analyst",
    "Business Analyst",
    "Project Manager",
    "QA Engineer",
    "Security Engineer",
    "Cloud Architect",
    "Mobile Developer",
    "System Administrator",
    "Database Administrator",
    "Network Engineer",
    "AI Researcher",
];

const PROGRAMMING: &[&str] = &[
    "Python", "Java", "JavaScript", "C++", "Go", "Ruby", "PHP", "Swift", "Kotlin", "TypeScript",
];

const FRAMEWORKS: &[&str] = &[
    "React",
    "Angular",
    "Vue.js",
    "Django",
    "Flask",
    "Spring Boot",
    "Express.js",
    "TensorFlow",
    "PyTorch",
    "Scikit-learn",
];

const DATABASES: &[&str] = &[
    "MySQL",
    "PostgreSQL",
    "MongoDB",
    "Redis",
    "Cassandra",
    "DynamoDB",
    "Oracle",
    "SQL Server",
];

const CLOUD: &[&str] = &[
    "AWS",
    "Azure",
    "Google Cloud",
    "Docker",
    "Kubernetes",
    "Terraform",
    "Jenkins",
    "CircleCI",
];

const SOFT_SKILLS: &[&str] = &[
    "Leadership",
    "Communication",
    "Problem Solving",
    "Team Collaboration",
    "Agile",
    "Scrum",
    "Critical Thinking",
];

const EXPERIENCE_DESCRIPTIONS: &[&str] = &[
    "Developed and maintained scalable web applications",
    "Led a team of developers in building microservices architecture",
    "Implemented machine learning models for predictive analytics",
    "Designed and optimized database schemas for high performance",
    "Collaborated with cross-functional teams to deliver products",
    "Automated deployment processes using CI/CD pipelines",
    "Conducted code reviews and mentored junior developers",
    "Improved system performance by optimizing algorithms",
    "Built RESTful APIs and integrated third-party services",
    "Created data visualizations and dashboards for stakeholders",
];

const EDUCATION: &[&str] = &[
    "Bachelor's in Computer Science",
    "Master's in Data Science",
    "Bachelor's in Information Technology",
    "Master's in Software Engineering",
    "PhD in Machine Learning",
    "Bachelor's in Mathematics",
    "Master's in Artificial Intelligence",
];

/// Seeded generator of synthetic resumes
#[derive(Debug)]
pub struct DatasetGenerator {
    rng: StdRng,
    skill_pool: Vec<&'static str>,
}

impl DatasetGenerator {
    /// Create a generator; the same seed always yields the same dataset
    pub fn new(seed: u64) -> Self {
        let skill_pool = [PROGRAMMING, FRAMEWORKS, DATABASES, CLOUD, SOFT_SKILLS].concat();
        Self {
            rng: StdRng::seed_from_u64(seed),
            skill_pool,
        }
    }

    /// Generate a single resume
    pub fn resume(&mut self, id: u32) -> Resume {
        let job_title = pick(&mut self.rng, JOB_TITLES);

        let num_skills = self.rng.gen_range(5..=10);
        let skills: Vec<String> = self
            .skill_pool
            .choose_multiple(&mut self.rng, num_skills)
            .map(|s| s.to_string())
            .collect();

        let num_experiences = self.rng.gen_range(2..=4);
        let experience: Vec<String> = EXPERIENCE_DESCRIPTIONS
            .choose_multiple(&mut self.rng, num_experiences)
            .map(|s| s.to_string())
            .collect();

        let education = pick(&mut self.rng, EDUCATION);
        let years_experience = self.rng.gen_range(1..=15);
        let name = format!("Candidate {id}");

        let bullets: Vec<String> = experience.iter().map(|e| format!("- {e}")).collect();
        let resume_text = format!(
            "Name: {name}\nJob Title: {job_title}\nYears of Experience: {years_experience}\n\n\
             Skills: {}\n\nExperience:\n{}\n\nEducation: {education}",
            skills.join(", "),
            bullets.join("\n"),
        );

        Resume {
            id,
            name,
            job_title,
            years_experience,
            skills,
            experience,
            education,
            resume_text,
        }
    }

    /// Generate `count` resumes with ids `1..=count`
    pub fn generate(&mut self, count: usize) -> Vec<Resume> {
        (1..=count as u32).map(|id| self.resume(id)).collect()
    }
}

fn pick(rng: &mut StdRng, items: &[&str]) -> String {
    items.choose(rng).copied().unwrap_or_default().to_string()
}

/// Generate a dataset with a fixed seed
pub fn generate_dataset(count: usize, seed: u64) -> Vec<Resume> {
    DatasetGenerator::new(seed).generate(count)
}

/// Write resumes as pretty-printed JSON
pub fn save_dataset(resumes: &[Resume], path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            FyeError::StorageError(format!("Failed to create {}: {e}", parent.display()))
        })?;
    }

    let json = serde_json::to_string_pretty(resumes)
        .map_err(|e| FyeError::StorageError(format!("Failed to serialize resumes: {e}")))?;
    std::fs::write(path, json).map_err(|e| {
        FyeError::StorageError(format!("Failed to write {}: {e}", path.display()))
    })?;

    tracing::info!("Saved {} resumes to {}", resumes.len(), path.display());
    Ok(())
}

/// Read a JSON array of resumes
pub fn load_dataset(path: impl AsRef<Path>) -> Result<Vec<Resume>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| {
        FyeError::StorageError(format!("Failed to read {}: {e}", path.display()))
    })?;

    serde_json::from_str(&content)
        .map_err(|e| FyeError::StorageError(format!("Failed to parse {}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_same_seed_same_dataset() {
        assert_eq!(generate_dataset(10, 7), generate_dataset(10, 7));
        assert_ne!(generate_dataset(10, 7), generate_dataset(10, 8));
    }

    #[test]
    fn test_resume_shape() {
        for resume in generate_dataset(50, 42) {
            assert!((5..=10).contains(&resume.skills.len()));
            assert!((2..=4).contains(&resume.experience.len()));
            assert!((1..=15).contains(&resume.years_experience));
            assert!(JOB_TITLES.contains(&resume.job_title.as_str()));
            assert!(EDUCATION.contains(&resume.education.as_str()));

            let distinct: HashSet<&String> = resume.skills.iter().collect();
            assert_eq!(distinct.len(), resume.skills.len());
        }
    }

    #[test]
    fn test_ids_and_text() {
        let resumes = generate_dataset(3, 1);
        let ids: Vec<u32> = resumes.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);

        let text = &resumes[1].resume_text;
        assert!(text.starts_with("Name: Candidate 2\nJob Title: "));
        assert!(text.contains(&format!("Skills: {}", resumes[1].skills.join(", "))));
        assert!(text.contains(&format!("- {}", resumes[1].experience[0])));
        assert!(text.ends_with(&format!("Education: {}", resumes[1].education)));
    }

    #[test]
    fn test_save_and_load_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resumes.json");

        let resumes = generate_dataset(5, 3);
        save_dataset(&resumes, &path).unwrap();
        assert_eq!(load_dataset(&path).unwrap(), resumes);
    }

    #[test]
    fn test_load_missing_dataset() {
        assert!(matches!(
            load_dataset("/nonexistent/resumes.json"),
            Err(FyeError::StorageError(_))
        ));
    }
}
