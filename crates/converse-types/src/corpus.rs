//! Training corpus types for Converse.
//!
//! The corpus maps application ids to parallel pattern/response/tag arrays.
//! The serde layout matches the persisted JSON exactly:
//!
//! ```json
//! {"applications": {"customer_support": {"patterns": [...], "responses": [...], "tags": [...]}}}
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Labeled examples for a single application.
///
/// `patterns` and `tags` are parallel arrays: `tags[i]` labels `patterns[i]`.
/// `responses` is parallel up to its own length; applications authored with
/// fewer responses than patterns fall back to tag-level candidates at
/// response-selection time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApplicationData {
    #[serde(default)]
    pub patterns: Vec<String>,
    #[serde(default)]
    pub responses: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl ApplicationData {
    /// Whether the pattern/tag arrays satisfy the corpus invariant:
    /// equal length, no empty patterns.
    pub fn is_consistent(&self) -> bool {
        self.patterns.len() == self.tags.len()
            && self.patterns.iter().all(|p| !p.trim().is_empty())
    }

    /// Append one labeled example.
    pub fn push_example(&mut self, pattern: String, response: String, tag: String) {
        self.patterns.push(pattern);
        self.responses.push(response);
        self.tags.push(tag);
    }
}

/// The full training corpus: application id -> labeled examples.
///
/// Built once at startup or on retrain; immutable between retrains.
/// `BTreeMap` keeps application iteration order deterministic.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainingCorpus {
    #[serde(default)]
    pub applications: BTreeMap<String, ApplicationData>,
}

impl TrainingCorpus {
    /// Total pattern count across all applications.
    pub fn pattern_count(&self) -> usize {
        self.applications.values().map(|a| a.patterns.len()).sum()
    }

    /// Ordered list of application ids.
    pub fn application_ids(&self) -> Vec<String> {
        self.applications.keys().cloned().collect()
    }

    /// Append one labeled example, creating the application if unknown.
    pub fn add_example(&mut self, application: &str, pattern: String, response: String, tag: String) {
        self.applications
            .entry(application.to_string())
            .or_default()
            .push_example(pattern, response, tag);
    }

    /// The default seed corpus written out when no data file exists yet.
    ///
    /// Covers four applications: customer support, college helpdesk,
    /// HR recruitment, and a small personal assistant.
    pub fn starter() -> Self {
        let mut corpus = TrainingCorpus::default();

        let customer_support = ApplicationData {
            patterns: strings(&[
                "hello",
                "hi",
                "hey",
                "good morning",
                "good afternoon",
                "i need help with my order",
                "order status",
                "track my package",
                "return policy",
                "refund request",
                "cancel order",
                "product not working",
                "broken item",
                "defective product",
                "shipping delay",
                "when will my order arrive",
                "delivery time",
                "payment issue",
                "billing problem",
                "charge dispute",
            ]),
            responses: strings(&[
                "Hello! I'm here to help with your customer service needs.",
                "Hi there! What can I assist you with today?",
                "Hey! How can I help you?",
                "Good morning! What can I do for you?",
                "Good afternoon! How can I assist?",
                "I can help you with your order. What seems to be the problem?",
                "I can check your order status. Please provide your order number.",
                "Let me look up your package. Do you have the tracking number?",
                "Our return policy allows returns within 30 days of purchase.",
                "I can start a refund for you. Which order is this about?",
                "I can cancel that order if it hasn't shipped yet.",
                "I'm sorry to hear you're having issues. Let me help you with that.",
                "Sorry the item arrived broken. We can replace it or refund you.",
                "Sorry about the defective product. Let's get that sorted.",
                "For shipping delays, I can check the current status for you.",
                "Let me check the estimated delivery date for your order.",
                "Delivery usually takes 3-5 business days. I can check yours.",
                "I can help with payment issues. What seems to be the problem?",
                "I can look into that billing problem for you.",
                "I can open a dispute review for that charge.",
            ]),
            tags: strings(&[
                "greeting",
                "greeting",
                "greeting",
                "greeting",
                "greeting",
                "order_help",
                "order_status",
                "order_status",
                "return_policy",
                "refund",
                "cancel_order",
                "product_issue",
                "product_issue",
                "product_issue",
                "shipping",
                "shipping",
                "shipping",
                "payment",
                "payment",
                "payment",
            ]),
        };
        corpus
            .applications
            .insert("customer_support".to_string(), customer_support);

        let college_helpdesk = ApplicationData {
            patterns: strings(&[
                "admission requirements",
                "how to apply",
                "application deadline",
                "tuition fees",
                "scholarships",
                "financial aid",
                "course registration",
                "class schedule",
                "prerequisites",
                "campus facilities",
                "library hours",
                "computer lab",
            ]),
            responses: strings(&[
                "Admission requirements include a completed application and transcripts.",
                "You can apply online through the admissions portal.",
                "The application deadline for fall semester is August 1st.",
                "Tuition fees vary by program. I can check specific costs for you.",
                "We offer various scholarships based on academic performance.",
                "Financial aid applications open in January each year.",
                "Course registration opens two weeks before each semester.",
                "You can check the class schedule on the student portal.",
                "Prerequisites are listed on each course's catalog page.",
                "Most campus facilities are open from 7 AM to 10 PM.",
                "The library is open from 8 AM to 10 PM on weekdays.",
                "The computer lab is in the library basement, open until midnight.",
            ]),
            tags: strings(&[
                "admissions",
                "admissions",
                "admissions",
                "fees",
                "financial",
                "financial",
                "registration",
                "schedule",
                "courses",
                "facilities",
                "facilities",
                "facilities",
            ]),
        };
        corpus
            .applications
            .insert("college_helpdesk".to_string(), college_helpdesk);

        let hr_recruitment = ApplicationData {
            patterns: strings(&[
                "job openings",
                "current vacancies",
                "career opportunities",
                "application process",
                "how to apply",
                "submit resume",
                "interview process",
                "hiring stages",
                "technical interview",
                "salary range",
                "compensation",
                "benefits package",
            ]),
            responses: strings(&[
                "We have openings in engineering, marketing, and sales departments.",
                "You can view all current vacancies on our careers page.",
                "Career opportunities are posted weekly on the careers portal.",
                "You can apply through our careers portal with your resume.",
                "Applications go through the careers portal; it takes a few minutes.",
                "Submit your resume through the portal and we'll be in touch.",
                "Our interview process typically includes 3-4 stages.",
                "Hiring stages: resume screening, phone screen, then interviews.",
                "The technical interview covers practical problems in your field.",
                "Salary ranges are competitive and based on experience.",
                "Compensation is discussed after the first interview round.",
                "We offer comprehensive health benefits and retirement plans.",
            ]),
            tags: strings(&[
                "openings",
                "openings",
                "openings",
                "application",
                "application",
                "application",
                "interview",
                "interview",
                "interview",
                "compensation",
                "compensation",
                "benefits",
            ]),
        };
        corpus
            .applications
            .insert("hr_recruitment".to_string(), hr_recruitment);

        let personal_assistant = ApplicationData {
            patterns: strings(&[
                "what's the time",
                "current time",
                "time please",
                "weather today",
                "weather forecast",
                "will it rain",
                "set reminder",
                "remind me to",
                "schedule meeting",
                "tell me a joke",
                "make me laugh",
                "something funny",
            ]),
            responses: strings(&[
                "I can check the time for you. One moment...",
                "Let me check the current time for you.",
                "Checking the time now.",
                "For weather information, I recommend checking a weather app.",
                "For the forecast, a dedicated weather service will be most accurate.",
                "I can't see the sky from here, but a weather app can tell you.",
                "I can help you set reminders. What should I remind you about?",
                "Sure, what should the reminder say?",
                "I can help schedule that. When works for you?",
                "Why don't scientists trust atoms? Because they make up everything!",
                "Why did the scarecrow win an award? He was outstanding in his field!",
                "What do you call a fake noodle? An impasta!",
            ]),
            tags: strings(&[
                "time",
                "time",
                "time",
                "weather",
                "weather",
                "weather",
                "reminder",
                "reminder",
                "schedule",
                "joke",
                "joke",
                "joke",
            ]),
        };
        corpus
            .applications
            .insert("personal_assistant".to_string(), personal_assistant);

        corpus
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
