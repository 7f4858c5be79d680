use std::sync::Arc;

use dashboard_client::{
    AreaController, ControllerContext, ControllerEvent, DashboardController, Method, Navigation,
    QueueArea, ResourceClient, Router, ScheduledJobsArea, SchedulesArea, ViewEvent, WorkersArea,
};
use dashboard_core::NoticeKind;
use dashboard_domain::route::match_fragment;
use dashboard_domain::{Area, AttributeValue, DashboardError};
use dashboard_forms::SubmissionState;
use dashboard_testing_utils::{EventRecorder, ListResponseBuilder, MockTransport, RecordBuilder};
use serde_json::json;

fn context(transport: &MockTransport) -> ControllerContext {
    ControllerContext::new(ResourceClient::new(Arc::new(transport.clone())))
}

fn navigate_fragments(recorder: &EventRecorder<ControllerEvent>) -> Vec<String> {
    recorder
        .events()
        .into_iter()
        .filter_map(|event| match event {
            ControllerEvent::Navigate { fragment, .. } => Some(fragment),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn test_queue_fragment_page_clamp_scenario() {
    let transport = MockTransport::new();
    transport
        .on_get(
            "queue",
            ListResponseBuilder::new()
                .record(RecordBuilder::queued_job(1, "first"))
                .page(2, 5)
                .total(48)
                .build(),
        )
        .on_get(
            "queue",
            ListResponseBuilder::new()
                .record(RecordBuilder::queued_job(9, "last"))
                .page(5, 5)
                .total(48)
                .build(),
        );

    let context = context(&transport);
    let recorder = EventRecorder::attach(&context.events);
    let mut controller = AreaController::new(QueueArea, context);

    let matched = match_fragment("queue/q/foo/p/2");
    assert_eq!(matched.area, Area::Queue);
    let params = matched.normalize();
    assert_eq!(params.search, "foo");
    assert_eq!(params.page_number, 2);
    assert_eq!(params.id, 0);
    assert_eq!(params.action, "");

    controller.index(&matched.params).await.unwrap();
    assert!(navigate_fragments(&recorder).is_empty());
    assert_eq!(controller.state().page_count, 5);
    assert_eq!(controller.state().page_number, 2);

    assert!(controller.page(6).await.unwrap());

    let requests = transport.requests_to(Method::Get, "queue");
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].query_value("q"), Some("foo"));
    assert_eq!(requests[1].query_value("p"), Some("5"));
    assert_eq!(controller.fragment(), "queue/q/foo/p/5");
    assert_eq!(navigate_fragments(&recorder), vec!["queue/q/foo/p/5".to_string()]);
    assert!(!controller.state().loading);
}

#[tokio::test]
async fn test_page_same_value_is_noop_and_low_values_clamp() {
    let transport = MockTransport::new();
    transport.on_get("queue", ListResponseBuilder::new().page(1, 3).build());

    let mut controller = AreaController::new(QueueArea, context(&transport));
    controller.fetch().await.unwrap();
    assert_eq!(transport.request_count(), 1);

    assert!(!controller.page(1).await.unwrap());
    assert!(!controller.page(-4).await.unwrap());
    assert_eq!(transport.request_count(), 1);

    assert!(controller.page(3).await.unwrap());
    assert_eq!(transport.request_count(), 2);
}

#[tokio::test]
async fn test_page_before_count_known_forces_first_page() {
    let transport = MockTransport::new();
    let mut controller = AreaController::new(QueueArea, context(&transport));
    assert!(!controller.page(4).await.unwrap());
    assert_eq!(transport.request_count(), 0);
}

#[tokio::test]
async fn test_index_clamps_page_when_fetch_fails() {
    let transport = MockTransport::new();
    transport
        .on_get("queue", ListResponseBuilder::new().page(1, 5).build())
        .on_status(Method::Get, "queue", 500, None);

    let context = context(&transport);
    let recorder = EventRecorder::attach(&context.events);
    let mut controller = AreaController::new(QueueArea, context);
    controller.fetch().await.unwrap();

    let result = controller.index(&match_fragment("queue/p/9").params).await;
    assert!(result.is_err());

    let state = controller.state();
    assert!(state.page_number <= state.page_count.max(1));
    assert_eq!(state.page_number, 5);
    assert_eq!(controller.fragment(), "queue/p/5");
    assert_eq!(controller.pager().page_number, 5);
    assert_eq!(transport.last_request().unwrap().query_value("p"), Some("5"));
    assert!(navigate_fragments(&recorder).is_empty());
}

#[tokio::test]
async fn test_server_page_correction_updates_fragment() {
    let transport = MockTransport::new();
    transport
        .on_get("queue", ListResponseBuilder::new().page(5, 5).build())
        .on_get("queue", ListResponseBuilder::new().page(4, 4).build())
        .on_get("queue", ListResponseBuilder::new().page(3, 3).build());

    let context = context(&transport);
    let recorder = EventRecorder::attach(&context.events);
    let mut controller = AreaController::new(QueueArea, context);

    controller.index(&match_fragment("queue/p/5").params).await.unwrap();
    assert!(navigate_fragments(&recorder).is_empty());

    // 刷新时最后一页已被清空
    controller.fetch().await.unwrap();
    assert_eq!(controller.state().page_number, 4);
    assert_eq!(controller.fragment(), "queue/p/4");
    assert_eq!(navigate_fragments(&recorder), vec!["queue/p/4".to_string()]);

    // 路由入口仍然保持静默
    controller.index(&match_fragment("queue/p/4").params).await.unwrap();
    assert_eq!(controller.state().page_number, 3);
    assert_eq!(navigate_fragments(&recorder).len(), 1);
}

#[tokio::test]
async fn test_search_submit_resets_page() {
    let transport = MockTransport::new();
    transport
        .on_get("history", ListResponseBuilder::new().page(4, 9).build())
        .on_get("history", ListResponseBuilder::new().page(1, 2).build());

    let mut controller = AreaController::new(dashboard_client::HistoryArea, context(&transport));
    controller
        .index(&match_fragment("history/p/4").params)
        .await
        .unwrap();
    assert_eq!(controller.state().page_number, 4);

    controller
        .handle_view_event(ViewEvent::SearchSubmit(" backup ".to_string()))
        .await
        .unwrap();

    let last = transport.last_request().unwrap();
    assert_eq!(last.query_value("q"), Some("backup"));
    assert_eq!(last.query_value("p"), Some("1"));
    assert_eq!(controller.fragment(), "history/q/backup");

    controller.handle_view_event(ViewEvent::SearchCancel).await.unwrap();
    assert_eq!(transport.last_request().unwrap().query_value("q"), Some(""));
    assert_eq!(controller.fragment(), "history");
}

#[tokio::test]
async fn test_fetch_failure_notifies_and_clears_loading() {
    let transport = MockTransport::new();
    transport.on_status(Method::Get, "workers", 500, None);

    let context = context(&transport);
    let notices = context.notices.clone();
    let mut controller = AreaController::new(WorkersArea, context);

    let error = controller.fetch().await.unwrap_err();
    assert_eq!(error.status_code(), Some(500));
    assert!(!controller.state().loading);

    let notice = notices.current().unwrap();
    assert_eq!(notice.kind, NoticeKind::Error);
    assert_eq!(notice.message, "Server error.");
}

#[tokio::test]
async fn test_invalid_schedule_never_reaches_server() {
    let transport = MockTransport::new();
    transport.on_get(
        "schedules",
        ListResponseBuilder::new()
            .record(
                RecordBuilder::schedule(5, "Weekly")
                    .field("RepeatType", "None")
                    .field("RepeatValue", serde_json::Value::Null),
            )
            .build(),
    );

    let mut controller = AreaController::new(SchedulesArea, context(&transport));
    controller.fetch().await.unwrap();
    transport.clear_requests();

    let mut form = controller.edit(5).unwrap();
    let Err(DashboardError::Validation(errors)) = controller.edit_submit(&mut form).await else {
        panic!("expected local validation failure");
    };

    assert!(errors.contains_key("RepeatType"));
    assert!(errors.contains_key("RepeatValue"));
    assert_eq!(form.state(), SubmissionState::EditingWithErrors);
    assert_eq!(transport.request_count(), 0);
}

#[tokio::test]
async fn test_edit_submit_success_flow() {
    let transport = MockTransport::new();
    transport
        .on_get(
            "schedules",
            ListResponseBuilder::new()
                .record(RecordBuilder::schedule(5, "Nightly"))
                .build(),
        )
        .on(
            Method::Put,
            "schedules/5",
            dashboard_client::ApiResponse::no_content(),
        );

    let context = context(&transport);
    let notices = context.notices.clone();
    let recorder = EventRecorder::attach(&context.events);
    let mut controller = AreaController::new(SchedulesArea, context);
    controller.fetch().await.unwrap();

    let mut form = controller.edit(5).unwrap();
    assert_eq!(controller.state().selected_id, 5);
    assert_eq!(controller.fragment(), "schedules/id/5/edit");

    form.form_mut().set_value("Name", "Nightly cleanup");
    controller.edit_submit(&mut form).await.unwrap();

    let put = transport.requests_to(Method::Put, "schedules/5");
    assert_eq!(put.len(), 1);
    let body = put[0].body.as_ref().unwrap();
    assert_eq!(body["Name"], json!("Nightly cleanup"));
    assert_eq!(body["StartOn"], json!("2024-03-05T14:07:00.000Z"));
    assert_eq!(body["Enabled"], json!(true));

    assert_eq!(form.state(), SubmissionState::Closed);
    assert_eq!(controller.state().selected_id, 0);
    assert_eq!(notices.current().unwrap().message, "Schedule saved.");
    assert_eq!(
        navigate_fragments(&recorder),
        vec!["schedules/id/5/edit".to_string(), "schedules".to_string()]
    );
    assert_eq!(transport.requests_to(Method::Get, "schedules").len(), 2);
}

#[tokio::test]
async fn test_save_succeeds_when_refresh_fails() {
    let transport = MockTransport::new();
    transport
        .on_get(
            "schedules",
            ListResponseBuilder::new()
                .record(RecordBuilder::schedule(5, "Nightly"))
                .build(),
        )
        .on_status(Method::Get, "schedules", 500, None)
        .on(
            Method::Put,
            "schedules/5",
            dashboard_client::ApiResponse::no_content(),
        );

    let context = context(&transport);
    let notices = context.notices.clone();
    let mut controller = AreaController::new(SchedulesArea, context);
    controller.fetch().await.unwrap();

    let mut form = controller.edit(5).unwrap();
    form.form_mut().set_value("Name", "Nightly cleanup");
    assert!(controller.edit_submit(&mut form).await.is_ok());

    assert_eq!(transport.requests_to(Method::Put, "schedules/5").len(), 1);
    assert_eq!(form.state(), SubmissionState::Closed);
    assert_eq!(controller.state().selected_id, 0);
    assert!(!controller.state().loading);
    let notice = notices.current().unwrap();
    assert_eq!(notice.kind, NoticeKind::Error);
    assert_eq!(notice.message, "Server error.");
}

#[tokio::test]
async fn test_create_posts_to_collection() {
    let transport = MockTransport::new();
    transport
        .on_get("queue", ListResponseBuilder::new().build())
        .on(
            Method::Post,
            "queue",
            dashboard_client::ApiResponse::ok(RecordBuilder::queued_job(31, "new").build()),
        );

    let mut controller = AreaController::new(QueueArea, context(&transport));
    let mut form = controller.add().unwrap();
    assert!(form.is_new());

    form.form_mut().set_value("QueueName", "default");
    form.form_mut().set_value("JobType", "Tasks.Echo, Tasks");
    form.form_mut().set_value("Data", "{\n  \"message\": \"hi\"\n}");
    controller.edit_submit(&mut form).await.unwrap();

    let post = transport.requests_to(Method::Post, "queue");
    assert_eq!(post.len(), 1);
    let body = post[0].body.as_ref().unwrap();
    assert_eq!(body["Id"], json!(0));
    assert_eq!(body["Data"], json!("{\"message\":\"hi\"}"));
}

#[tokio::test]
async fn test_server_validation_errors_stay_in_form() {
    let transport = MockTransport::new();
    transport
        .on_get(
            "workers",
            ListResponseBuilder::new()
                .record(RecordBuilder::worker(3, "builder"))
                .build(),
        )
        .on_status(
            Method::Put,
            "workers/3",
            400,
            Some(json!({"Name": "Name already exists.", "License": "Worker limit reached."})),
        );

    let context = context(&transport);
    let notices = context.notices.clone();
    let mut controller = AreaController::new(WorkersArea, context);
    controller.fetch().await.unwrap();

    let mut form = controller.edit(3).unwrap();
    let error = controller.edit_submit(&mut form).await.unwrap_err();
    assert!(error.is_field_level());

    assert_eq!(form.state(), SubmissionState::EditingWithErrors);
    assert_eq!(form.errors().fields["Name"], "Name already exists.");
    assert_eq!(form.errors().summary, vec!["Worker limit reached.".to_string()]);
    assert!(notices.current().is_none());
    assert_eq!(controller.state().selected_id, 3);
    assert_eq!(transport.requests_to(Method::Get, "workers").len(), 1);
}

#[tokio::test]
async fn test_delete_transport_failure_resets_baseline() {
    let transport = MockTransport::new();
    transport
        .on_get(
            "queue",
            ListResponseBuilder::new()
                .record(RecordBuilder::queued_job(7, "doomed"))
                .build(),
        )
        .fail(Method::Delete, "queue/7", "connection reset");

    let context = context(&transport);
    let notices = context.notices.clone();
    let mut controller = AreaController::new(QueueArea, context);
    controller.fetch().await.unwrap();

    let mut form = controller.confirm_delete(7).unwrap();
    assert_eq!(controller.fragment(), "queue/id/7/delete");

    let error = controller.edit_delete(&mut form).await.unwrap_err();
    assert_eq!(error.status_code(), Some(0));
    assert_eq!(form.state(), SubmissionState::Editing);
    assert_eq!(notices.current().unwrap().message, "Unknown error (0).");
    assert_eq!(controller.state().selected_id, 0);
    assert_eq!(transport.requests_to(Method::Get, "queue").len(), 2);
}

#[tokio::test]
async fn test_signal_rolls_back_on_failure() {
    let transport = MockTransport::new();
    transport
        .on_get(
            "workers",
            ListResponseBuilder::new()
                .record(RecordBuilder::worker(3, "builder"))
                .build(),
        )
        .on_status(Method::Get, "workers", 500, None)
        .on_status(Method::Post, "workers/3/signal", 403, None);

    let context = context(&transport);
    let notices = context.notices.clone();
    let mut controller = AreaController::new(WorkersArea, context);
    controller.fetch().await.unwrap();

    let mut form = controller.signal(3).unwrap();
    form.form_mut().set_value("Signal", "Stop");
    assert!(controller.signal_submit(&mut form).await.is_err());

    let signal_requests = transport.requests_to(Method::Post, "workers/3/signal");
    assert_eq!(signal_requests[0].body, Some(json!({"Signal": "Stop"})));

    let record = controller.state().find(3).unwrap();
    assert_eq!(record.get("Signal"), &AttributeValue::text("None"));
    assert!(record.pending_signal().is_none());
    // 最后一条通知来自重新拉取列表的失败
    assert_eq!(notices.current().unwrap().message, "Server error.");
}

#[tokio::test]
async fn test_signal_commit_on_success() {
    let transport = MockTransport::new();
    transport
        .on_get(
            "working",
            ListResponseBuilder::new()
                .record(RecordBuilder::working_job(8, 3))
                .build(),
        )
        .on_get(
            "working",
            ListResponseBuilder::new()
                .record(RecordBuilder::working_job(8, 3).field("Signal", "Cancel"))
                .build(),
        )
        .on(
            Method::Post,
            "working/8/signal",
            dashboard_client::ApiResponse::no_content(),
        );

    let context = context(&transport);
    let notices = context.notices.clone();
    let mut controller = AreaController::new(dashboard_client::WorkingArea, context);
    controller.fetch().await.unwrap();

    assert!(controller.edit(8).is_err());
    let mut form = controller.signal(8).unwrap();
    form.form_mut().set_value("Signal", "Cancel");
    controller.signal_submit(&mut form).await.unwrap();

    let record = controller.state().find(8).unwrap();
    assert_eq!(record.get("Signal"), &AttributeValue::text("Cancel"));
    assert!(record.pending_signal().is_none());
    assert_eq!(notices.current().unwrap().message, "Job signalled: Cancel.");
}

#[tokio::test]
async fn test_details_are_memoized() {
    let transport = MockTransport::new();
    transport
        .on_get(
            "history",
            ListResponseBuilder::new()
                .record(RecordBuilder::new(4).field("JobName", "report"))
                .build(),
        )
        .on_get(
            "history/4",
            RecordBuilder::new(4)
                .field("JobName", "report")
                .field("Exception", "System.TimeoutException")
                .build(),
        );

    let mut controller = AreaController::new(dashboard_client::HistoryArea, context(&transport));
    controller.fetch().await.unwrap();

    assert!(controller.details(4).await.unwrap());
    assert!(!controller.details(4).await.unwrap());
    assert_eq!(transport.requests_to(Method::Get, "history/4").len(), 1);

    let record = controller.state().find(4).unwrap();
    assert!(record.details_loaded);
    assert_eq!(
        record.get("Exception"),
        &AttributeValue::text("System.TimeoutException")
    );

    assert!(matches!(
        controller.details(99).await,
        Err(DashboardError::RecordNotFound { id: 99 })
    ));
}

#[tokio::test]
async fn test_counts_flow_into_navigation() {
    let transport = MockTransport::new();
    transport
        .on_get(
            "queue",
            ListResponseBuilder::new().counts(12, 40, 3, 2, 1).build(),
        )
        .on_get(
            "counts",
            json!({"QueueCount": 11, "HistoryCount": 41, "ScheduleCount": 3, "WorkerCount": 2, "WorkingCount": 0}),
        );

    let context = context(&transport);
    let navigation = Navigation::new();
    navigation.bind(&context.events);
    let published = EventRecorder::attach(&context.events);

    let mut queue = AreaController::new(QueueArea, context.clone());
    queue.fetch().await.unwrap();
    assert_eq!(navigation.count(Area::Queue), Some(12));
    assert_eq!(navigation.count(Area::Working), Some(1));

    let mut dashboard = DashboardController::new(context);
    let counts = dashboard.index().await.unwrap();
    assert_eq!(counts.queue_count, 11);
    assert_eq!(navigation.count(Area::Queue), Some(11));
    assert_eq!(navigation.count(Area::History), Some(41));
    assert_eq!(published.len(), 2);
}

#[tokio::test]
async fn test_router_dispatches_nested_area() {
    let transport = MockTransport::new();
    transport
        .on_get(
            "schedules/5/jobs",
            ListResponseBuilder::new()
                .record(RecordBuilder::scheduled_job(2, 5))
                .build(),
        )
        .on_get("counts", json!({}));

    let context = context(&transport);
    let mut router = Router::new();
    router.register(DashboardController::new(context.clone()));
    router.register(AreaController::new(ScheduledJobsArea, context.clone()));

    assert_eq!(
        router.dispatch("#schedules/id/5/jobs").await.unwrap(),
        Area::ScheduledJobs
    );
    assert_eq!(transport.requests_to(Method::Get, "schedules/5/jobs").len(), 1);

    // 没有注册 Queue 控制器，也匹配不到的片段一样回落
    assert_eq!(router.dispatch("queue/p/2").await.unwrap(), Area::Dashboard);
    assert_eq!(router.dispatch("no/such/route").await.unwrap(), Area::Dashboard);
    assert_eq!(transport.requests_to(Method::Get, "counts").len(), 2);
}

#[tokio::test]
async fn test_new_scheduled_job_belongs_to_parent() {
    let transport = MockTransport::new();
    transport.on_get("schedules/5/jobs", ListResponseBuilder::new().build());

    let mut controller = AreaController::new(ScheduledJobsArea, context(&transport));
    controller
        .index(&match_fragment("schedules/id/5/jobs").params)
        .await
        .unwrap();

    let form = controller.add().unwrap();
    assert_eq!(form.form().controls("ScheduleId")[0].value, "5");
    assert_eq!(controller.fragment(), "schedules/id/5/jobs");
}
