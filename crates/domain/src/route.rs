//! 路由编解码
//!
//! 片段语法：`area[/q/:search][/p/:page][/id/:id[/:action]]`，
//! 嵌套的计划任务为 `schedules/id/:parent_id/jobs[...]`。
//! 每个区域声明一张穷举的路由表（最具体的在前），全局表中计划任务排在
//! 计划之前；任何表都匹配不到的片段静默落到 Dashboard。

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::area::Area;

const DASHBOARD_ALIAS: &str = "dashboard";
const NESTED_SEGMENT: &str = "jobs";

/// 规范化后的路由参数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteParams {
    pub area: Area,
    pub parent_id: i64,
    pub search: String,
    pub page_number: i64,
    pub id: i64,
    pub action: String,
}

impl RouteParams {
    pub fn new(area: Area) -> Self {
        Self {
            area,
            parent_id: 0,
            search: String::new(),
            page_number: 1,
            id: 0,
            action: String::new(),
        }
    }

    pub fn with_search<S: Into<String>>(mut self, search: S) -> Self {
        self.search = search.into();
        self
    }

    pub fn with_page(mut self, page_number: i64) -> Self {
        self.page_number = page_number;
        self
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = id;
        self
    }

    pub fn with_action<S: Into<String>>(mut self, action: S) -> Self {
        self.action = action.into();
        self
    }

    pub fn with_parent(mut self, parent_id: i64) -> Self {
        self.parent_id = parent_id;
        self
    }

    /// 片段能够表达的形式：页码至少为 1，负数编号归零，
    /// 没有编号时丢弃动作，非嵌套区域没有父编号
    pub fn normalize(&self) -> Self {
        if self.area == Area::Dashboard {
            return Self::new(Area::Dashboard);
        }

        let id = self.id.max(0);
        Self {
            area: self.area,
            parent_id: if self.area.is_nested() {
                self.parent_id.max(0)
            } else {
                0
            },
            search: self.search.clone(),
            page_number: self.page_number.max(1),
            id,
            action: if id > 0 {
                self.action.clone()
            } else {
                String::new()
            },
        }
    }

    pub fn fragment(&self) -> String {
        encode(self)
    }
}

/// 片段中匹配出的原始参数，尚未解码和校验
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRouteParams {
    pub parent_id: Option<String>,
    pub search: Option<String>,
    pub page: Option<String>,
    pub id: Option<String>,
    pub action: Option<String>,
}

impl RawRouteParams {
    /// 非数字或负数取默认值，页码小于 1 取 1
    pub fn normalize(&self, area: Area) -> RouteParams {
        let mut params = RouteParams::new(area);
        if area == Area::Dashboard {
            return params;
        }

        if area.is_nested() {
            params.parent_id = parse_non_negative(self.parent_id.as_deref()).unwrap_or(0);
        }
        params.search = self.search.as_deref().map(decode_component).unwrap_or_default();
        params.page_number = self
            .page
            .as_deref()
            .and_then(|page| page.trim().parse::<i64>().ok())
            .filter(|page| *page >= 1)
            .unwrap_or(1);
        params.id = parse_non_negative(self.id.as_deref()).unwrap_or(0);
        if params.id > 0 {
            params.action = self.action.as_deref().map(decode_component).unwrap_or_default();
        }
        params
    }
}

fn parse_non_negative(value: Option<&str>) -> Option<i64> {
    value
        .and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|v| *v >= 0)
}

fn decode_component(value: &str) -> String {
    urlencoding::decode(value)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| value.to_string())
}

/// 片段匹配结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    pub area: Area,
    pub pattern: &'static str,
    pub params: RawRouteParams,
}

impl RouteMatch {
    pub fn normalize(&self) -> RouteParams {
        self.params.normalize(self.area)
    }
}

/// 把路由参数编码为片段（不带 `#`）
pub fn encode(params: &RouteParams) -> String {
    let params = params.normalize();
    if params.area == Area::Dashboard {
        return String::new();
    }

    let mut fragment = params.area.fragment().to_string();
    if params.area.is_nested() {
        fragment.push_str(&format!("/id/{}/{}", params.parent_id, NESTED_SEGMENT));
    }
    if !params.search.is_empty() {
        fragment.push_str("/q/");
        fragment.push_str(&urlencoding::encode(&params.search));
    }
    if params.page_number > 1 {
        fragment.push_str(&format!("/p/{}", params.page_number));
    }
    if params.id > 0 {
        fragment.push_str(&format!("/id/{}", params.id));
        if !params.action.is_empty() {
            fragment.push('/');
            fragment.push_str(&urlencoding::encode(&params.action));
        }
    }
    fragment
}

/// 在全局路由表中查找片段
pub fn match_fragment(fragment: &str) -> RouteMatch {
    let fragment = fragment.trim().trim_start_matches('#').trim_end_matches('/');
    let segments: Vec<&str> = if fragment.is_empty() {
        Vec::new()
    } else {
        fragment.split('/').collect()
    };

    for route in routes() {
        if let Some(params) = route.capture(&segments) {
            return RouteMatch {
                area: route.area,
                pattern: route.pattern.as_str(),
                params,
            };
        }
    }

    debug!("片段 {:?} 未匹配任何路由，回落到 Dashboard", fragment);
    RouteMatch {
        area: Area::Dashboard,
        pattern: "*",
        params: RawRouteParams::default(),
    }
}

pub fn decode(fragment: &str) -> RouteParams {
    match_fragment(fragment).normalize()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Param {
    ParentId,
    Search,
    Page,
    Id,
    Action,
}

#[derive(Debug)]
enum Segment {
    Literal(String),
    Capture(Param),
}

#[derive(Debug)]
struct Route {
    area: Area,
    pattern: String,
    segments: Vec<Segment>,
}

impl Route {
    fn parse(area: Area, pattern: String) -> Self {
        let segments = if pattern.is_empty() {
            Vec::new()
        } else {
            pattern
                .split('/')
                .map(|segment| match segment {
                    ":parent_id" => Segment::Capture(Param::ParentId),
                    ":search" => Segment::Capture(Param::Search),
                    ":page" => Segment::Capture(Param::Page),
                    ":id" => Segment::Capture(Param::Id),
                    ":action" => Segment::Capture(Param::Action),
                    literal => Segment::Literal(literal.to_string()),
                })
                .collect()
        };
        Self {
            area,
            pattern,
            segments,
        }
    }

    fn capture(&self, input: &[&str]) -> Option<RawRouteParams> {
        if input.len() != self.segments.len() {
            return None;
        }

        let mut params = RawRouteParams::default();
        for (segment, value) in self.segments.iter().zip(input) {
            match segment {
                Segment::Literal(literal) if literal == value => {}
                Segment::Literal(_) => return None,
                Segment::Capture(_) if value.is_empty() => return None,
                Segment::Capture(param) => {
                    let slot = match param {
                        Param::ParentId => &mut params.parent_id,
                        Param::Search => &mut params.search,
                        Param::Page => &mut params.page,
                        Param::Id => &mut params.id,
                        Param::Action => &mut params.action,
                    };
                    *slot = Some(value.to_string());
                }
            }
        }
        Some(params)
    }
}

/// 区域的穷举路由表，最具体的在前
pub fn area_patterns(area: Area) -> Vec<&'static str> {
    routes()
        .iter()
        .filter(|route| route.area == area)
        .map(|route| route.pattern.as_str())
        .collect()
}

fn area_table(area: Area) -> Vec<String> {
    let prefix = match area {
        Area::Dashboard => return vec![DASHBOARD_ALIAS.to_string(), String::new()],
        Area::ScheduledJobs => format!("{}/id/:parent_id/{}", area.fragment(), NESTED_SEGMENT),
        other => other.fragment().to_string(),
    };

    let mut patterns = Vec::with_capacity(12);
    for search in ["/q/:search", ""] {
        for page in ["/p/:page", ""] {
            for item in ["/id/:id/:action", "/id/:id", ""] {
                patterns.push(format!("{prefix}{search}{page}{item}"));
            }
        }
    }
    patterns
}

fn routes() -> &'static [Route] {
    static ROUTES: OnceLock<Vec<Route>> = OnceLock::new();
    ROUTES.get_or_init(|| {
        [
            Area::ScheduledJobs,
            Area::Schedules,
            Area::Queue,
            Area::History,
            Area::Workers,
            Area::Working,
            Area::Dashboard,
        ]
        .into_iter()
        .flat_map(|area| {
            area_table(area)
                .into_iter()
                .map(move |pattern| Route::parse(area, pattern))
        })
        .collect()
    })
}
