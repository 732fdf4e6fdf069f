//! Issue reporting and the help desk.

use domains::models::IssueStatus;
use domains::AppError;
use integration_tests::World;
use services::IssueReport;

fn report(description: &str) -> IssueReport {
    IssueReport {
        name: "Balu".to_string(),
        email: "balu@gram-bazaar.test".to_string(),
        description: description.to_string(),
    }
}

#[tokio::test]
async fn anonymous_reports_are_accepted() {
    let world = World::new().await;

    let issue = world
        .support
        .report_issue(None, report("Photos fail to upload on slow connections."))
        .await
        .unwrap();
    assert_eq!(issue.status, IssueStatus::New);
    assert_eq!(issue.user_id, None);

    let queue = world.support.list_issues(world.admin).await.unwrap();
    assert_eq!(queue.len(), 1);
}

#[tokio::test]
async fn status_moves_forward_only_and_notifies_the_reporter() {
    let world = World::new().await;
    let issue = world
        .support
        .report_issue(Some(world.seller), report("Chat list does not refresh."))
        .await
        .unwrap();

    // Skipping in-progress is allowed.
    let resolved = world
        .support
        .advance_issue(world.admin, issue.id, IssueStatus::Resolved)
        .await
        .unwrap();
    assert_eq!(resolved.status, IssueStatus::Resolved);

    let inbox = world.notifications.list_for(world.seller).await.unwrap();
    assert_eq!(inbox.len(), 1);
    assert!(inbox[0].message.contains("resolved"));

    // Resolved is terminal.
    let err = world
        .support
        .advance_issue(world.admin, issue.id, IssueStatus::InProgress)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn only_admins_touch_the_issue_queue() {
    let world = World::new().await;
    let issue = world
        .support
        .report_issue(Some(world.seller), report("Typo on the listing form."))
        .await
        .unwrap();

    let err = world.support.list_issues(world.seller).await.unwrap_err();
    assert!(matches!(err, AppError::PermissionDenied { .. }));

    let err = world
        .support
        .advance_issue(world.seller, issue.id, IssueStatus::InProgress)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::PermissionDenied { .. }));
}

#[tokio::test]
async fn help_messages_reach_the_admin_desk() {
    let world = World::new().await;

    world
        .support
        .send_help_message(
            world.buyer,
            "chandra@gram-bazaar.test",
            "How do I change my mobile number?",
        )
        .await
        .unwrap();

    let err = world
        .support
        .send_help_message(world.buyer, "chandra@gram-bazaar.test", "   ")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let desk = world.support.list_help_messages(world.admin).await.unwrap();
    assert_eq!(desk.len(), 1);
    assert_eq!(desk[0].message, "How do I change my mobile number?");

    let err = world
        .support
        .list_help_messages(world.buyer)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::PermissionDenied { .. }));
}
