// crates/schoolsphere-e2e/src/catalog.rs
// ============================================================================
// Module: Built-in Scenario Catalog
// Description: The stock admin, teacher, and student UI scenarios.
// Purpose: Provide ready-to-run coverage of the main SchoolSphere flows.
// Dependencies: crate::{locator, scenario}
// ============================================================================

//! ## Overview
//! Every built-in scenario signs in through [`login_steps`] and then walks
//! one feature end to end. Records created by a scenario carry `{stamp}` in
//! their names so reruns never collide, and scenarios that create records
//! delete them again.

use crate::locator::Locator;
use crate::scenario::Account;
use crate::scenario::Role;
use crate::scenario::Scenario;
use crate::scenario::Step;

/// Placeholder of the login email field.
const EMAIL_PLACEHOLDER: &str = "m@example.com";

/// Returns the sign-in steps for an account.
#[must_use]
pub fn login_steps(account: &Account) -> Vec<Step> {
    vec![
        Step::goto("/login"),
        Step::fill(Locator::placeholder(EMAIL_PLACEHOLDER), account.email.clone()).with_timeout_ms(15_000),
        Step::fill(Locator::css(r#"input[id="password"]"#), account.password.clone()),
        Step::click(Locator::role("button", "Sign In")),
        Step::expect_visible(Locator::text("Dashboard")).with_timeout_ms(10_000),
    ]
}

/// Returns the built-in scenarios in catalog order.
#[must_use]
pub fn builtin_scenarios() -> Vec<Scenario> {
    vec![
        login(),
        take_attendance(),
        historical_attendance(),
        attendance_reports(),
        student_management(),
        student_monitoring(),
        teacher_management(),
        communications(),
        video_conferencing(),
        resources(),
        admin_payment_actions(),
        student_payment_view(),
        student_dashboard(),
    ]
}

/// Returns the built-in scenario with the given name.
#[must_use]
pub fn find_builtin(name: &str) -> Option<Scenario> {
    builtin_scenarios().into_iter().find(|scenario| scenario.name == name)
}

fn scenario(name: &str, description: &str, role: Role, steps: Vec<Step>) -> Scenario {
    Scenario {
        name: name.to_string(),
        description: description.to_string(),
        login: Some(role),
        steps,
    }
}

/// Opens a row's action menu, confirms deletion, and waits for the toast.
fn delete_row(record_id: &str, display_name: &str, toast: &str) -> Vec<Step> {
    vec![
        Step::click(Locator::any_role("row").containing(record_id, Locator::any_role("button"))),
        Step::click(Locator::role("menuitem", "Delete")),
        Step::expect_visible(Locator::text("Are you sure?")),
        Step::click(Locator::role("button", "Delete")),
        Step::expect_visible(Locator::text(toast)),
        Step::expect_hidden(Locator::text(display_name)),
    ]
}

fn login() -> Scenario {
    scenario("login", "Sign in as an administrator and reach the dashboard", Role::Admin, vec![
        Step::screenshot("dashboard"),
    ])
}

fn take_attendance() -> Scenario {
    scenario("take-attendance", "Open a class register as a teacher", Role::Teacher, vec![
        Step::click(Locator::test_id("link-take attendance")),
        Step::expect_url_contains("take-attendance").with_timeout_ms(10_000),
        Step::click(Locator::any_role("combobox")),
        Step::click(Locator::role("option", "SS1 Science")),
        Step::expect_visible(Locator::text("John Doe")),
        Step::expect_visible(Locator::text("Jane Smith")),
        Step::expect_visible(Locator::text("Peter Jones")),
        Step::screenshot("take-attendance"),
    ])
}

fn historical_attendance() -> Scenario {
    scenario("historical-attendance", "Browse past attendance for a class as a teacher", Role::Teacher, vec![
        Step::click(Locator::test_id("link-historical attendance")),
        Step::expect_url_contains("historical-attendance").with_timeout_ms(10_000),
        Step::click(Locator::any_role("combobox")),
        Step::click(Locator::role("option", "SS1 Science")),
        Step::expect_visible(Locator::text("John Doe")),
        Step::expect_visible(Locator::text("Jane Smith")),
        Step::expect_visible(Locator::text("Peter Jones")),
        Step::screenshot("historical-attendance"),
    ])
}

fn attendance_reports() -> Scenario {
    scenario("attendance-reports", "Open the attendance reports as an administrator", Role::Admin, vec![
        Step::click(Locator::test_id("link-attendance reports")),
        Step::expect_url_contains("attendance-reports").with_timeout_ms(10_000),
        Step::expect_visible(Locator::text("Overall Attendance")),
        Step::expect_visible(Locator::text("Daily Attendance Trend")),
        Step::screenshot("attendance-reports"),
    ])
}

fn student_monitoring() -> Scenario {
    scenario("student-monitoring", "Open a student profile and its attendance and payment tabs", Role::Admin, vec![
        Step::click(Locator::role("link", "Students")),
        Step::expect_visible(Locator::role("heading", "Students")).with_timeout_ms(10_000),
        Step::click(Locator::css("tbody tr:first-of-type button")),
        Step::click(Locator::role("menuitem", "View Details")),
        Step::expect_visible(Locator::role("heading", "Student Profile")).with_timeout_ms(10_000),
        Step::click(Locator::role("tab", "Attendance")),
        Step::pause(2_000),
        Step::screenshot("student-profile-attendance"),
        Step::click(Locator::role("tab", "Payments")),
        Step::pause(2_000),
        Step::screenshot("student-profile-payments"),
    ])
}

fn student_management() -> Scenario {
    let mut steps = vec![
        Step::click(Locator::role("link", "Students")),
        Step::expect_visible(Locator::text("Student Management")),
        Step::click(Locator::role("button", "Add Student")),
        Step::fill(Locator::label("Student ID"), "TEST-{stamp}"),
        Step::fill(Locator::label("First Name"), "Test"),
        Step::fill(Locator::label("Last Name"), "Student"),
        Step::click(Locator::label("Class")),
        Step::click(Locator::role("option", "SS1 Science")),
        Step::click(Locator::role("button", "Create Student")),
        Step::expect_visible(Locator::text("Test Student")),
        Step::screenshot("student-created"),
    ];
    steps.extend(delete_row("TEST-{stamp}", "Test Student", "Student deleted successfully"));
    steps.push(Step::screenshot("student-deleted"));
    scenario("student-management", "Create and delete a student record", Role::Admin, steps)
}

fn teacher_management() -> Scenario {
    let mut steps = vec![
        Step::click(Locator::role("link", "Teachers")),
        Step::expect_visible(Locator::text("Teacher Management")),
        Step::click(Locator::role("button", "Add Teacher")),
        Step::fill(Locator::label("Employee ID"), "EMP-{stamp}"),
        Step::fill(Locator::label("First Name"), "Test"),
        Step::fill(Locator::label("Last Name"), "Teacher"),
        Step::click(Locator::role("button", "Create Teacher")),
        Step::expect_visible(Locator::text("Test Teacher")),
        Step::screenshot("teacher-created"),
    ];
    steps.extend(delete_row("EMP-{stamp}", "Test Teacher", "Teacher deleted successfully"));
    steps.push(Step::screenshot("teacher-deleted"));
    scenario("teacher-management", "Create and delete a teacher record", Role::Admin, steps)
}

fn communications() -> Scenario {
    let message = "Hello John! This is a test message at {stamp}";
    let title = "Test Thread {stamp}";
    let reply = "This is a reply to the test thread.";
    scenario("communications", "Send a chat message and reply in a forum thread", Role::Teacher, vec![
        Step::click(Locator::role("link", "Communications")),
        Step::expect_url_contains("communications").with_timeout_ms(10_000),
        Step::click(Locator::role("button", "New Chat")),
        Step::expect_visible(Locator::text("Start a new conversation")),
        Step::fill(Locator::placeholder("Search for users..."), "John Doe"),
        Step::click(Locator::role("option", "John Doe")),
        Step::click(Locator::role("button", "Start Chat")),
        Step::expect_visible(Locator::text("Chat with John Doe")),
        Step::fill(Locator::placeholder("Type a message..."), message),
        Step::click(Locator::role("button", "Send")),
        Step::expect_visible(Locator::text(message)),
        Step::screenshot("chat-sent"),
        Step::click(Locator::role("tab", "Forum")),
        Step::click(Locator::role("button", "New Thread")),
        Step::fill(Locator::label("Title"), title),
        Step::fill(Locator::label("Content"), "This is the content of the test thread."),
        Step::click(Locator::role("button", "Create Thread")),
        Step::expect_visible(Locator::text(title)),
        Step::click(Locator::text(title)),
        Step::fill(Locator::placeholder("Write a reply..."), reply),
        Step::click(Locator::role("button", "Post Reply")),
        Step::expect_visible(Locator::text(reply)),
        Step::screenshot("forum-reply"),
    ])
}

fn video_conferencing() -> Scenario {
    let topic = "Test Meeting {stamp}";
    let card = |target: Locator| Locator::css(".card").containing(topic, target);
    scenario("video-conferencing", "Create a meeting room and end it", Role::Teacher, vec![
        Step::click(Locator::role("link", "Video Conferencing")),
        Step::expect_url_contains("video-conferencing").with_timeout_ms(10_000),
        Step::expect_visible(Locator::text("Meeting Rooms")),
        Step::click(Locator::role("button", "Create Meeting")),
        Step::fill(Locator::label("Topic"), topic),
        Step::click(Locator::role("button", "Create")),
        Step::expect_visible(card(Locator::text("Active"))).with_timeout_ms(10_000),
        Step::expect_visible(card(Locator::text("0 Participants"))),
        Step::screenshot("meeting-created"),
        Step::click(card(Locator::role("button", "End Meeting"))),
        Step::expect_visible(card(Locator::text("Ended"))),
        Step::expect_disabled(card(Locator::role("button", "Meeting Ended"))),
        Step::screenshot("meeting-ended"),
    ])
}

fn resources() -> Scenario {
    let title = "Test Resource {stamp}";
    scenario("resources", "Upload a resource and delete it", Role::Teacher, vec![
        Step::click(Locator::role("link", "Resources")),
        Step::expect_url_contains("resources").with_timeout_ms(10_000),
        Step::click(Locator::role("button", "Upload")),
        Step::expect_visible(Locator::text("Upload New Resource")),
        Step::fill(Locator::label("Title"), title),
        Step::fill(Locator::label("Description"), "This is a test resource description."),
        Step::fill(Locator::label("Subject"), "Testing"),
        Step::upload_file(
            Locator::css(r#"input[type="file"]"#),
            "test_upload.txt",
            "This is a test file for resource upload.",
        ),
        Step::expect_visible(Locator::text("test_upload.txt")),
        Step::click(Locator::role("button", "Submit")),
        Step::expect_visible(Locator::text(title)).with_timeout_ms(10_000),
        Step::screenshot("resource-created"),
        Step::click(
            Locator::css(".card")
                .containing(title, Locator::css("button:has(svg.lucide-more-horizontal)")),
        ),
        Step::click(Locator::role("menuitem", "Delete")),
        Step::expect_visible(Locator::text("Are you sure?")),
        Step::click(Locator::role("button", "Delete")),
        Step::expect_visible(Locator::text("Resource deleted.")),
        Step::expect_hidden(Locator::text(title)),
        Step::screenshot("resource-deleted"),
    ])
}

fn admin_payment_actions() -> Scenario {
    scenario("admin-payment-actions", "Mark a pending payment as paid", Role::Admin, vec![
        Step::click(Locator::role("link", "Payments")),
        Step::expect_url_contains("payments").with_timeout_ms(10_000),
        Step::expect_visible(Locator::text("Payment Management")),
        Step::screenshot("payments"),
        Step::click(Locator::any_role("row").containing("pending", Locator::role("button", "Mark Paid"))),
        Step::expect_visible(Locator::text("Payment marked as paid.")),
        Step::screenshot("payment-marked-paid"),
    ])
}

fn student_payment_view() -> Scenario {
    scenario("student-payment-view", "Review fees and payment history as a student", Role::Student, vec![
        Step::click(Locator::role("link", "Payments")),
        Step::expect_url_contains("payments").with_timeout_ms(10_000),
        Step::expect_visible(Locator::text("My Payments")),
        Step::expect_visible(Locator::text("Payment History")),
        Step::expect_visible(Locator::text("Outstanding")),
        Step::screenshot("student-payments"),
    ])
}

fn student_dashboard() -> Scenario {
    scenario("student-dashboard", "Check the student dashboard widgets", Role::Student, vec![
        Step::expect_visible(Locator::text("Student Dashboard")),
        Step::expect_visible(Locator::text("My Profile")),
        Step::screenshot("student-dashboard"),
    ])
}

// ============================================================================
// SECTION: Tests
// ============================================================================
