// src/services/catalog.rs
use crate::frontend::View;
use crate::services::controller::{SessionController, SubmitOutcome};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    pub title: &'static str,
    pub category: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
    pub duration: &'static str,
    pub syllabus: &'static [&'static str],
}

pub static COURSES: [Course; 6] = [
    Course {
        title: "Data Science & AI",
        category: "Advanced Technology",
        icon: "fas fa-brain",
        description: "Master the future with hands-on training in Data Science and Artificial \
            Intelligence. Learn to transform businesses through data.",
        duration: "8 Weeks",
        syllabus: &[
            "Intro to Data Science",
            "Machine Learning Algorithms",
            "Neural Networks & Deep Learning",
            "AI Ethics & Applications",
            "Real-world Projects",
        ],
    },
    Course {
        title: "Python Programming",
        category: "Programming",
        icon: "fab fa-python",
        description: "From basics to system-level programming. The perfect foundation for \
            automation and modern software development.",
        duration: "4 Weeks",
        syllabus: &[
            "Python Basics & Syntax",
            "Control Structures",
            "Functional Programming",
            "File I/O & Modules",
            "System Programming with Python",
        ],
    },
    Course {
        title: "Linux Administration",
        category: "Operating Systems",
        icon: "fab fa-linux",
        description: "Comprehensive training in Linux Essentials, Administration, and Kernel \
            Programming. Become an open-source expert.",
        duration: "6 Weeks",
        syllabus: &[
            "Linux Essentials",
            "User & Group Management",
            "System Administration",
            "Kernel Programming Basics",
            "Shell Scripting & Automation",
        ],
    },
    Course {
        title: "Cloud Computing",
        category: "Cloud",
        icon: "fas fa-cloud",
        description: "Master Virtualization and OpenStack. Learn to manage and scale modern cloud \
            infrastructures.",
        duration: "5 Weeks",
        syllabus: &[
            "Cloud Fundamentals",
            "Virtualization Technologies",
            "OpenStack Architecture",
            "Cloud Storage & Security",
            "Managing Cloud Infrastructure",
        ],
    },
    Course {
        title: "IoT & Raspberry Pi",
        category: "Hardware",
        icon: "fas fa-microchip",
        description: "Dive into hardware with Raspberry Pi and Arduino. Build smart connected \
            systems for the modern age.",
        duration: "6 Weeks",
        syllabus: &[
            "Electronic Fundamentals",
            "Raspberry Pi & Arduino Setup",
            "Sensors & Actuators",
            "IoT Protocols (MQTT/HTTP)",
            "End-to-End IoT Project",
        ],
    },
    Course {
        title: "Full Stack Web Dev",
        category: "Web Computing",
        icon: "fas fa-code",
        description: "Master PHP, WordPress, and database management. Build responsive, \
            professional websites from scratch.",
        duration: "8 Weeks",
        syllabus: &[
            "HTML5 & CSS3 Essentials",
            "Responsive Design with Bootstrap",
            "PHP & MySQL Database",
            "CMS with WordPress",
            "Web Security Best Practices",
        ],
    },
];

pub fn courses() -> &'static [Course] {
    &COURSES
}

impl SessionController {
    pub async fn show_courses(&self) {
        self.set_view(View::CourseCatalog).await;
    }

    pub async fn show_chat(&self) {
        self.set_view(View::Chat).await;
    }

    async fn set_view(&self, view: View) {
        self.state.write().await.view = view;
        self.frontend().show_view(view);
    }

    /// Select a course and open its details. `None` for an unknown index.
    pub async fn open_course(&self, index: usize) -> Option<&'static Course> {
        let course = COURSES.get(index)?;
        {
            let mut state = self.state.write().await;
            state.selected_course = Some(index);
            state.course_modal_open = true;
        }
        self.frontend().course_modal(Some(course));
        Some(course)
    }

    pub async fn close_course_modal(&self) {
        self.state.write().await.course_modal_open = false;
        self.frontend().course_modal(None);
    }

    /// Leave the catalog and ask the bot about the selected course.
    pub async fn ask_about_selected_course(&self) -> SubmitOutcome {
        let selected = self.state.read().await.selected_course;
        let Some(course) = selected.and_then(|i| COURSES.get(i)) else {
            return SubmitOutcome::Ignored;
        };
        self.close_course_modal().await;
        self.show_chat().await;
        self.submit(&format!("Tell me more about {}", course.title)).await
    }
}
