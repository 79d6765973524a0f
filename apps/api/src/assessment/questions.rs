//! Static assessment content: the question bank and the career path table.
//!
//! This is compiled-in configuration, not user input. Option weights are
//! positive; only question 4 offers a `devops` option.

use serde::{Deserialize, Serialize};

pub type QuestionId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CareerPath {
    Frontend,
    Backend,
    Fullstack,
    DataScience,
    Devops,
}

impl CareerPath {
    /// Fixed enumeration order. Tie-breaks resolve to the earliest entry.
    pub const ALL: [CareerPath; 5] = [
        CareerPath::Frontend,
        CareerPath::Backend,
        CareerPath::Fullstack,
        CareerPath::DataScience,
        CareerPath::Devops,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CareerPath::Frontend => "frontend",
            CareerPath::Backend => "backend",
            CareerPath::Fullstack => "fullstack",
            CareerPath::DataScience => "data_science",
            CareerPath::Devops => "devops",
        }
    }

    pub fn info(&self) -> &'static PathInfo {
        match self {
            CareerPath::Frontend => &FRONTEND,
            CareerPath::Backend => &BACKEND,
            CareerPath::Fullstack => &FULLSTACK,
            CareerPath::DataScience => &DATA_SCIENCE,
            CareerPath::Devops => &DEVOPS,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PathInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub skills: &'static [&'static str],
    pub tools: &'static [&'static str],
    pub courses: &'static [&'static str],
    pub resources: &'static [&'static str],
    pub salary_range: &'static str,
}

#[derive(Debug)]
pub struct AnswerOption {
    pub text: &'static str,
    pub path: CareerPath,
    pub points: u32,
}

#[derive(Debug)]
pub struct Question {
    pub id: QuestionId,
    pub prompt: &'static str,
    pub category: &'static str,
    pub options: &'static [AnswerOption],
}

/// Looks up a question by id.
pub fn question(id: QuestionId) -> Option<&'static Question> {
    QUESTIONS.iter().find(|q| q.id == id)
}

const fn opt(text: &'static str, path: CareerPath, points: u32) -> AnswerOption {
    AnswerOption { text, path, points }
}

use CareerPath::{Backend, DataScience, Devops, Frontend, Fullstack};

pub static QUESTIONS: [Question; 10] = [
    Question {
        id: 1,
        prompt: "What excites you most about technology?",
        category: "Interests",
        options: &[
            opt("Building beautiful, interactive user interfaces", Frontend, 3),
            opt("Creating robust server logic and databases", Backend, 3),
            opt("Both user experience and backend systems equally", Fullstack, 3),
            opt("Working with data, patterns, and AI/ML", DataScience, 3),
        ],
    },
    Question {
        id: 2,
        prompt: "How do you prefer to solve problems?",
        category: "Problem Solving",
        options: &[
            opt("Through visual and interactive design", Frontend, 3),
            opt("By writing efficient algorithms and logic", Backend, 3),
            opt("By connecting multiple systems together", Fullstack, 3),
            opt("By analyzing data and finding insights", DataScience, 3),
        ],
    },
    Question {
        id: 3,
        prompt: "Which technology area interests you most?",
        category: "Technology Preference",
        options: &[
            opt("HTML, CSS, JavaScript, React, Vue", Frontend, 3),
            opt("Node.js, Python, Databases, APIs", Backend, 3),
            opt("Full web stack from frontend to backend", Fullstack, 3),
            opt("Python, R, Machine Learning, Statistics", DataScience, 3),
        ],
    },
    Question {
        id: 4,
        prompt: "What's your ideal work environment?",
        category: "Work Environment",
        options: &[
            opt("Designing user experiences and interfaces", Frontend, 3),
            opt("Working with systems, servers, and infrastructure", Devops, 3),
            opt("Balancing both frontend and backend responsibilities", Fullstack, 3),
            opt("Working with large datasets and statistical models", DataScience, 3),
        ],
    },
    Question {
        id: 5,
        prompt: "How do you learn best?",
        category: "Learning Style",
        options: &[
            opt("By seeing visual results immediately", Frontend, 3),
            opt("By understanding deep concepts and architecture", Backend, 3),
            opt("By building end-to-end projects", Fullstack, 3),
            opt("By experimenting with data and models", DataScience, 3),
        ],
    },
    Question {
        id: 6,
        prompt: "What's your comfort level with mathematics?",
        category: "Mathematics",
        options: &[
            opt("Basic math is enough", Frontend, 2),
            opt("Moderate, with algorithms and logic", Backend, 2),
            opt("Comfortable with both", Fullstack, 2),
            opt("Advanced, comfortable with statistics and calculus", DataScience, 3),
        ],
    },
    Question {
        id: 7,
        prompt: "What would you build first?",
        category: "Project Preference",
        options: &[
            opt("A responsive, beautiful landing page", Frontend, 3),
            opt("A REST API with database", Backend, 3),
            opt("A complete web application", Fullstack, 3),
            opt("A data analysis project with visualizations", DataScience, 3),
        ],
    },
    Question {
        id: 8,
        prompt: "How important is job market demand?",
        category: "Career Outlook",
        options: &[
            opt("Very important, I want high demand skills", Frontend, 1),
            opt("Important, backend developers are always needed", Backend, 1),
            opt("Very important, fullstack is in high demand", Fullstack, 2),
            opt("Very important, data science is booming", DataScience, 3),
        ],
    },
    Question {
        id: 9,
        prompt: "How do you handle debugging and problem-solving?",
        category: "Problem Solving",
        options: &[
            opt("Using browser developer tools and visual debugging", Frontend, 3),
            opt("Logging, testing, and systematic debugging", Backend, 3),
            opt("Debugging across multiple layers", Fullstack, 3),
            opt("Using data analysis and statistical methods", DataScience, 3),
        ],
    },
    Question {
        id: 10,
        prompt: "What's your long-term career vision?",
        category: "Career Vision",
        options: &[
            opt("UX/UI Designer or Frontend Specialist", Frontend, 3),
            opt("Backend Engineer or Systems Architect", Backend, 3),
            opt("Full-stack Developer or Tech Lead", Fullstack, 3),
            opt("Data Scientist or ML Engineer", DataScience, 3),
        ],
    },
];

static FRONTEND: PathInfo = PathInfo {
    name: "Frontend Development",
    description: "Build beautiful, interactive user interfaces",
    skills: &["HTML/CSS", "JavaScript", "React/Vue/Angular", "Responsive Design", "UX/UI Basics"],
    tools: &["VS Code", "Chrome DevTools", "Figma", "Git"],
    courses: &["Web Design Fundamentals", "JavaScript Mastery", "React Advanced"],
    resources: &["MDN Web Docs", "CSS-Tricks", "Frontend Masters"],
    salary_range: "₦800k - ₦3M/month",
};

static BACKEND: PathInfo = PathInfo {
    name: "Backend Development",
    description: "Create robust server logic, databases, and APIs",
    skills: &["Node.js/Python", "Databases (SQL/NoSQL)", "API Design", "Authentication", "Testing"],
    tools: &["Postman", "Git", "Docker", "AWS/Heroku"],
    courses: &["Backend with Node.js", "Database Design", "REST API Development"],
    resources: &["Node.js Docs", "PostgreSQL Docs", "Backend Roadmap"],
    salary_range: "₦1M - ₦4M/month",
};

static FULLSTACK: PathInfo = PathInfo {
    name: "Full-Stack Development",
    description: "Master both frontend and backend development",
    skills: &["Frontend", "Backend", "Databases", "DevOps Basics", "System Design"],
    tools: &["Full-stack tools", "Docker", "Git", "CI/CD"],
    courses: &["MERN Stack", "Full-Stack Project", "System Design"],
    resources: &["Full-Stack Roadmap", "Web Dev Roadmap", "Architecture Patterns"],
    salary_range: "₦1.2M - ₦5M/month",
};

static DATA_SCIENCE: PathInfo = PathInfo {
    name: "Data Science & AI",
    description: "Analyze data and build machine learning models",
    skills: &["Python", "Statistics", "Machine Learning", "Data Visualization", "SQL"],
    tools: &["Jupyter", "Pandas", "TensorFlow", "Git"],
    courses: &["Python for Data", "Machine Learning", "Data Analysis"],
    resources: &["Kaggle", "Fast.ai", "Scikit-learn Docs"],
    salary_range: "₦1.5M - ₦6M/month",
};

static DEVOPS: PathInfo = PathInfo {
    name: "DevOps & Infrastructure",
    description: "Manage systems, servers, and deployment",
    skills: &["Linux", "Docker", "Kubernetes", "CI/CD", "Cloud Platforms"],
    tools: &["Docker", "Jenkins", "AWS", "Terraform"],
    courses: &["Docker Masterclass", "Kubernetes", "AWS Solutions"],
    resources: &["Docker Docs", "Kubernetes Docs", "AWS Learning"],
    salary_range: "₦1.3M - ₦5.5M/month",
};

// ────────────────────────────────────────────────────────────────────────────
// Public views (weights are not exposed to clients)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct QuestionView {
    pub id: QuestionId,
    pub prompt: &'static str,
    pub category: &'static str,
    pub options: Vec<&'static str>,
}

pub fn question_views() -> Vec<QuestionView> {
    QUESTIONS
        .iter()
        .map(|q| QuestionView {
            id: q.id,
            prompt: q.prompt,
            category: q.category,
            options: q.options.iter().map(|o| o.text).collect(),
        })
        .collect()
}

#[derive(Debug, Serialize)]
pub struct PathView {
    pub path: CareerPath,
    #[serde(flatten)]
    pub info: &'static PathInfo,
}

pub fn path_views() -> Vec<PathView> {
    CareerPath::ALL
        .iter()
        .map(|p| PathView {
            path: *p,
            info: p.info(),
        })
        .collect()
}
