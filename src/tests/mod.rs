use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::config::{Settings, FILTER_CLASSNAME};
use crate::controller::Controller;
use crate::events::{parse_script, Command, EventDispatcher, PageEvent};
use crate::filter::FilterType;
use crate::host::Host;
use crate::load::Loader;
use crate::output::{self, OutputFormat, RenderedList};
use crate::page::{Geometry, MemoryPage, Page};
use crate::utils::{page_count, Key};

fn sample_hosts(n: usize) -> Vec<Host> {
    (0..n)
        .map(|i| Host {
            name: format!("host-{i:02}"),
            location: "Porto".to_string(),
            rating: if i % 4 == 0 { 9.0 } else { 6.5 },
            price: 100 - i as u32,
            stars: if i % 5 == 0 { 5 } else { 3 },
            ..Default::default()
        })
        .collect()
}

fn controller() -> Controller<MemoryPage> {
    let page = MemoryPage::with_filter_controls(Geometry::default(), FILTER_CLASSNAME);
    Controller::new(page, Settings::default()).unwrap()
}

fn bundled_data() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data/hosts.json")
}

#[test]
fn scrolling_renders_the_rest_then_stops() {
    let mut c = controller();
    c.on_hosts_loaded(sample_hosts(20)).unwrap();
    assert_eq!(c.page().rendered_count(), 16);
    assert_eq!(c.page_number(), 1);

    c.page_mut().scroll_by(300.0);
    c.on_scroll();
    assert_eq!(c.page().rendered_count(), 20);
    assert_eq!(c.page_number(), 2);

    c.page_mut().scroll_by(300.0);
    c.on_scroll();
    assert_eq!(c.page().rendered_count(), 20);
    assert_eq!(c.page_number(), 2);
    assert_eq!(c.page_number(), page_count(20, Settings::default().page_size));
    assert!(!c.has_more_pages());
}

#[test]
fn filter_switch_resets_and_moves_active_class() {
    let mut c = controller();
    c.on_hosts_loaded(sample_hosts(20)).unwrap();
    c.page_mut().scroll_by(300.0);
    c.on_scroll();
    let clears = c.page().clear_count();

    let target = c.page().event_target("filter-top-rated");
    let outcome = c.on_filter_click(&target).unwrap();
    assert!(outcome.handled);
    assert_eq!(c.page().clear_count(), clears + 1);
    assert_eq!(c.page().rendered_count(), 5);
    assert_eq!(c.page_number(), 1);
    assert_eq!(c.page().scroll_top(), 0.0);
    assert_eq!(
        c.page().find_by_class("host-filter-active").as_deref(),
        Some("filter-top-rated")
    );
    assert!(c
        .page()
        .controls()
        .iter()
        .filter(|ctl| ctl.id != "filter-top-rated")
        .all(|ctl| !ctl.class_list.iter().any(|cls| cls == "host-filter-active")));
}

#[test]
fn keyboard_activation_only_on_enter_or_space() {
    let mut c = controller();
    c.on_hosts_loaded(sample_hosts(20)).unwrap();
    let target = c.page().event_target("filter-five-stars");

    let ignored = c.on_filter_keydown(&target, &Key::Tab).unwrap();
    assert!(!ignored.handled);
    assert_eq!(c.active_filter(), Some(FilterType::All));

    let pressed = c.on_filter_keydown(&target, &Key::Space).unwrap();
    assert!(pressed.handled && pressed.default_prevented);
    assert_eq!(c.active_filter(), Some(FilterType::FiveStars));
    assert_eq!(c.page().rendered_count(), 4);
}

#[test]
fn scroll_burst_renders_once_plus_trailing() {
    let settings = Settings {
        page_size: 4,
        ..Settings::default()
    };
    let page = MemoryPage::with_filter_controls(Geometry::default(), FILTER_CLASSNAME);
    let mut c = Controller::new(page, settings).unwrap();
    c.on_hosts_loaded(sample_hosts(60)).unwrap();
    assert_eq!(c.page().rendered_count(), 16);

    let mut dispatcher = EventDispatcher::new(c);
    let t0 = Instant::now();

    dispatcher.controller_mut().page_mut().scroll_by(240.0);
    assert!(dispatcher.dispatch(PageEvent::Scroll, t0).unwrap().handled);
    assert_eq!(dispatcher.controller().page().rendered_count(), 20);

    for ms in [10, 20, 30, 40] {
        dispatcher.controller_mut().page_mut().scroll_by(50.0);
        let outcome = dispatcher
            .dispatch(PageEvent::Scroll, t0 + Duration::from_millis(ms))
            .unwrap();
        assert!(!outcome.handled);
    }
    assert_eq!(dispatcher.controller().page().rendered_count(), 20);
    assert_eq!(
        dispatcher.next_deadline(),
        Some(t0 + Duration::from_millis(100))
    );

    assert!(!dispatcher.flush(t0 + Duration::from_millis(90)));
    assert!(dispatcher.flush(t0 + Duration::from_millis(100)));
    assert_eq!(dispatcher.controller().page().rendered_count(), 24);
    assert!(!dispatcher.flush(t0 + Duration::from_millis(300)));
    assert_eq!(dispatcher.next_deadline(), None);
}

#[test]
fn scripted_session_drives_the_dispatcher() {
    let script = "scroll 300\nclick filter-cheapest\nkey Enter filter-nearby\nquit\n";
    let mut c = controller();
    c.on_hosts_loaded(sample_hosts(20)).unwrap();
    let mut dispatcher = EventDispatcher::new(c);
    let now = Instant::now();

    for command in parse_script(script).unwrap() {
        let event = match command {
            Command::Scroll { dy } => {
                dispatcher.controller_mut().page_mut().scroll_by(dy);
                PageEvent::Scroll
            }
            Command::Click { id } => PageEvent::Click {
                target: dispatcher.controller().page().event_target(&id),
            },
            Command::Key { key, id } => PageEvent::KeyDown {
                target: dispatcher.controller().page().event_target(&id),
                key,
            },
            Command::Wait { .. } => continue,
            Command::Quit => break,
        };
        dispatcher.dispatch(event, now).unwrap();
    }

    let c = dispatcher.into_controller();
    assert_eq!(c.active_filter(), Some(FilterType::Cheapest));
    let prices: Vec<u32> = c.rendered_hosts().iter().map(|h| h.price).collect();
    assert_eq!(prices.len(), 16);
    assert!(prices.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(prices[0], 81);
}

#[tokio::test]
async fn bundled_data_loads_into_controller() {
    let loader = Loader::from_source(bundled_data().to_str().unwrap()).unwrap();
    let mut c = controller();
    let loaded = loader.load(|hosts| c.on_hosts_loaded(hosts)).await;
    assert_eq!(loaded, Some(Ok(())));

    assert_eq!(c.hosts().len(), 20);
    assert_eq!(c.page().rendered_count(), 16);
    assert!(c.is_wired());

    c.set_filter_enabled(FilterType::TopRated).unwrap();
    let names: Vec<&str> = c.rendered_hosts().iter().map(|h| h.name.as_str()).collect();
    assert_eq!(
        names,
        [
            "The Grand Meridian",
            "Riad Amane",
            "Casa Azul",
            "Skyline Suites",
            "Sakura Stay"
        ]
    );

    c.set_filter_enabled(FilterType::FiveStars).unwrap();
    assert_eq!(c.rendered_hosts().len(), 4);

    c.set_filter_enabled(FilterType::Cheapest).unwrap();
    assert_eq!(c.rendered_hosts()[0].name, "Backpackers Base");
}

#[tokio::test]
async fn failed_load_leaves_page_unwired() {
    let loader = Loader::from_source("/nonexistent/hostlist/hosts.json").unwrap();
    let mut c = controller();
    let loaded = loader.load(|hosts| c.on_hosts_loaded(hosts)).await;
    assert!(loaded.is_none());
    assert!(!c.is_wired());
    assert_eq!(c.page().rendered_count(), 0);

    let target = c.page().event_target("filter-cheapest");
    assert!(!c.on_filter_click(&target).unwrap().handled);
    c.on_scroll();
    assert_eq!(c.page().rendered_count(), 0);
}

#[test]
fn html_report_reflects_rendered_page() {
    let mut c = controller();
    c.on_hosts_loaded(sample_hosts(20)).unwrap();
    let list = RenderedList {
        active_filter: c.active_filter(),
        hosts: c.rendered_hosts(),
        elements: c.page().rendered(),
        total: c.filtered_hosts().len(),
    };
    let html = String::from_utf8(output::render(OutputFormat::Html, &list)).unwrap();
    assert!(html.contains("16 of 20 hosts"));
    assert!(html.contains("host-filter host-filter-active"));
    assert_eq!(html.matches("<article class=\"host\"").count(), 16);
}
