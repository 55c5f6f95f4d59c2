//! Terminal rendering of sessions, pages and mutation outcomes

use chrono::Local;
use licensify_app::{
    AdminRequestsView, LicensesView, MutationOutcome, MyLicensesView, NavItem, Navigation, Page,
    RequestsView, Session,
};
use licensify_core::{ExpiryStatus, LicenseRequest, RequestStatus};

pub fn print_session(session: &Session) {
    if !session.is_logged_in {
        println!("🔒 Not logged in");
        return;
    }

    let name = if session.display_name.is_empty() {
        &session.email
    } else {
        &session.display_name
    };
    println!("👤 {}", name);
    println!("   Email: {}", session.email);
    println!("   User id: {}", session.user_id);
    if let Some(role) = session.role {
        println!("   Role: {}", role);
    }
}

pub fn print_navigation(nav: &Navigation) {
    if nav.redirected {
        println!("↪️  {} redirected to {}", nav.requested, nav.route.path());
    }
}

pub fn print_sidebar(items: &[NavItem], current: &Page) {
    println!("🧭 Pages:");
    for item in items {
        let marker = if item.route == current.route() { "▶" } else { " " };
        println!("  {} {:<16} {}", marker, item.label, item.route.path());
    }
}

pub fn print_page(page: &Page) {
    println!("\n📄 {}", page.route().title());

    match page {
        Page::Login => {
            println!("   Run `licensify login --email <email>` to sign in.");
            return;
        }
        _ if page.is_loading() => {
            println!("   ⏳ Loading...");
            return;
        }
        Page::Licenses(view) => print_licenses(view),
        Page::MyLicenses(view) => print_my_licenses(view),
        Page::Requests(view) => print_requests(view),
        Page::AdminRequests(view) => print_admin_requests(view),
    }

    if let Some((current, total)) = page.pagination() {
        println!("   page {}/{}", current, total);
    }
    if let Some(error) = page.last_error() {
        println!("❌ Failed to load: {}", error);
        if page.is_unauthorized() {
            println!("🔑 Your session has expired. Run `licensify login` again.");
        }
    }
}

pub fn print_outcome(label: &str, outcome: &MutationOutcome) {
    match outcome {
        MutationOutcome::Completed => println!("✅ {} submitted", label),
        MutationOutcome::Failed(message) => println!("❌ {} failed: {}", label, message),
        MutationOutcome::Skipped => println!("⏭️  {} skipped", label),
    }
}

fn print_licenses(view: &LicensesView) {
    print_search(view.search());
    let rows = view.visible();
    if rows.is_empty() {
        println!("   No licenses found.");
        return;
    }

    println!("   {:<12} {:<28} {:>10} {:>10}", "ID", "NAME", "PRICE", "AVAILABLE");
    for license in rows {
        println!(
            "   {:<12} {:<28} {:>10.2} {:>10}",
            truncate(&license.id, 12),
            truncate(license.display_name(), 28),
            license.price,
            license.available_count
        );
    }
}

fn print_my_licenses(view: &MyLicensesView) {
    print_search(view.search());
    let today = Local::now().date_naive();
    let rows = view.visible(today);
    if rows.is_empty() {
        println!("   You have no licenses yet.");
        return;
    }

    println!("   {:<28} {:<12} {:>10}  STATUS", "NAME", "EXPIRY", "PRICE");
    for row in rows {
        println!(
            "   {:<28} {:<12} {:>10.2}  {}",
            truncate(&row.license.name, 28),
            row.license.expiry,
            row.license.price,
            expiry_label(row.status)
        );
    }
}

fn print_requests(view: &RequestsView) {
    print_search(view.search());
    println!("   Status: {}", view.status_filter());
    print_request_rows(&view.visible(), "   No requests match.");
}

fn print_admin_requests(view: &AdminRequestsView) {
    println!("   Tab: {}", view.tab());
    print_request_rows(&view.visible(), "   Nothing to review.");

    if let (Some(request), Some(action)) = (view.dialog().item(), view.dialog().action()) {
        println!(
            "📝 {} {} (comment: {:?})",
            action,
            request.id,
            view.dialog().comment()
        );
    }
}

fn print_request_rows(rows: &[&LicenseRequest], empty: &str) {
    if rows.is_empty() {
        println!("{}", empty);
        return;
    }

    println!("   {:<12} {:<28} STATUS", "ID", "LICENSE");
    for request in rows {
        println!(
            "   {:<12} {:<28} {} {}",
            truncate(&request.id, 12),
            truncate(&request.license_name, 28),
            status_icon(request.status),
            request.status
        );
        for comment in &request.comments {
            println!("      💬 {}: {}", comment.user, comment.message);
        }
    }
}

fn print_search(term: &str) {
    if !term.is_empty() {
        println!("   🔍 \"{}\"", term);
    }
}

fn status_icon(status: RequestStatus) -> &'static str {
    match status {
        RequestStatus::Pending => "⏳",
        RequestStatus::Accepted => "✅",
        RequestStatus::Rejected => "⛔",
    }
}

fn expiry_label(status: ExpiryStatus) -> &'static str {
    match status {
        ExpiryStatus::Active => "active",
        ExpiryStatus::ExpiringSoon => "⚠️  expiring soon",
        ExpiryStatus::Expired => "expired",
        ExpiryStatus::Unknown => "unknown",
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
        cut.push('…');
        cut
    }
}
