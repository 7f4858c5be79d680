//! 区域控制器
//!
//! 维护片段、区域状态和表单三者一致。入站路径 [`AreaController::index`]
//! 只把路由参数静默写入状态再拉取列表，绝不发出导航事件；出站路径只有
//! [`AreaController::navigate`]。两条路径分开，路由与控制器才不会互相回声。
//!
//! 没有请求序号：后返回的响应覆盖先返回的。

use std::sync::Arc;

use dashboard_core::{EventBus, NoticeService};
use dashboard_domain::record::SIGNAL_ATTRIBUTE;
use dashboard_domain::route::encode;
use dashboard_domain::{Area, AreaModel, AreaState, Counts, RawRouteParams, RouteParams};
use dashboard_errors::{DashboardError, DashboardResult};
use dashboard_forms::{EditForm, FormCatalog, FormKind};
use tracing::{debug, info, warn};

use crate::areas::AreaDescriptor;
use crate::resource::ResourceClient;
use crate::views::{PagerView, SearchView, ViewEvent};

pub const ACTION_EDIT: &str = "edit";
pub const ACTION_DELETE: &str = "delete";
pub const ACTION_SIGNAL: &str = "signal";

/// 控制器对外发布的事件，所有控制器共用一条总线
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerEvent {
    /// 状态到路由的唯一出口
    Navigate {
        area: Area,
        state: AreaState,
        fragment: String,
    },
    Counts(Counts),
}

/// 控制器共享的服务
#[derive(Debug, Clone)]
pub struct ControllerContext {
    pub client: ResourceClient,
    pub forms: Arc<FormCatalog>,
    pub notices: NoticeService,
    pub events: EventBus<ControllerEvent>,
}

impl ControllerContext {
    pub fn new(client: ResourceClient) -> Self {
        Self {
            client,
            forms: FormCatalog::standard(),
            notices: NoticeService::new(),
            events: EventBus::new(),
        }
    }

    pub fn with_forms(mut self, forms: Arc<FormCatalog>) -> Self {
        self.forms = forms;
        self
    }

    pub fn with_notices(mut self, notices: NoticeService) -> Self {
        self.notices = notices;
        self
    }
}

#[derive(Debug)]
pub struct AreaController<D: AreaDescriptor> {
    descriptor: D,
    model: AreaModel,
    context: ControllerContext,
}

impl<D: AreaDescriptor> AreaController<D> {
    pub fn new(descriptor: D, context: ControllerContext) -> Self {
        Self {
            descriptor,
            model: AreaModel::new(D::AREA),
            context,
        }
    }

    pub fn area(&self) -> Area {
        D::AREA
    }

    pub fn descriptor(&self) -> &D {
        &self.descriptor
    }

    pub fn model(&self) -> &AreaModel {
        &self.model
    }

    pub fn state(&self) -> &AreaState {
        self.model.state()
    }

    pub fn fragment(&self) -> String {
        encode(&self.model.route_params())
    }

    pub fn pager(&self) -> PagerView {
        PagerView::from_state(self.state())
    }

    pub fn search_view(&self) -> SearchView {
        SearchView::from_state(self.state())
    }

    fn resource(&self) -> String {
        self.descriptor.resource_path(self.model.state())
    }

    /// 拉取当前页；失败时发出错误通知，`loading` 总会被清除。
    /// 服务端修正了页码时发出导航事件，使片段跟上实际所在页
    pub async fn fetch(&mut self) -> DashboardResult<()> {
        self.load(true).await
    }

    async fn load(&mut self, announce_correction: bool) -> DashboardResult<()> {
        self.model.set_loading(true);
        let resource = self.resource();
        let (search, page) = {
            let state = self.model.state();
            (state.search.clone(), state.page_number)
        };

        let result = self.context.client.list(&resource, &search, page).await;
        self.model.set_loading(false);

        match result {
            Ok(list) => {
                let counts = list.counts;
                self.model.replace_collection(list);
                if let Some(counts) = counts {
                    self.context.events.publish(&ControllerEvent::Counts(counts));
                }
                if announce_correction && self.model.state().page_number != page {
                    debug!("{} 页码由 {} 修正为 {}", D::AREA, page, self.model.state().page_number);
                    self.navigate();
                }
                Ok(())
            }
            Err(error) => {
                warn!("{} 列表拉取失败: {}", D::AREA, error);
                self.context.notices.error(error.user_message());
                Err(error)
            }
        }
    }

    /// 路由入口：参数静默写入状态后拉取列表，不发出导航事件
    pub async fn index(&mut self, raw: &RawRouteParams) -> DashboardResult<()> {
        let params = raw.normalize(D::AREA);
        self.import(&params).await
    }

    pub async fn import(&mut self, params: &RouteParams) -> DashboardResult<()> {
        self.model.import_route(params);
        self.load(false).await
    }

    /// 发出导航事件，携带当前状态和重新编码的片段
    pub fn navigate(&self) {
        let fragment = self.fragment();
        debug!("{} 导航到 #{}", D::AREA, fragment);
        self.context.events.publish(&ControllerEvent::Navigate {
            area: D::AREA,
            state: self.model.state().clone(),
            fragment,
        });
    }

    /// 用户选中一条记录（或清除选择）
    pub fn select(&mut self, id: i64, action: &str) -> bool {
        let changed = self.model.set_selection(id, action);
        if changed {
            self.navigate();
        }
        changed
    }

    pub fn add(&mut self) -> DashboardResult<EditForm> {
        let kind = self.require_form(self.descriptor.edit_form(), "新建")?;
        let record = self.descriptor.new_record(self.model.state());
        Ok(EditForm::new(self.context.forms.get(kind), &record))
    }

    pub fn edit(&mut self, id: i64) -> DashboardResult<EditForm> {
        let kind = self.require_form(self.descriptor.edit_form(), "编辑")?;
        self.open_form(kind, id, ACTION_EDIT)
    }

    pub fn confirm_delete(&mut self, id: i64) -> DashboardResult<EditForm> {
        if !self.descriptor.can_delete() {
            return Err(DashboardError::Unsupported(format!("{} 不支持删除", D::AREA)));
        }
        let kind = self.require_form(self.descriptor.edit_form(), "删除")?;
        self.open_form(kind, id, ACTION_DELETE)
    }

    pub fn signal(&mut self, id: i64) -> DashboardResult<EditForm> {
        let kind = self.require_form(self.descriptor.signal_form(), "信号")?;
        self.open_form(kind, id, ACTION_SIGNAL)
    }

    fn require_form(&self, kind: Option<FormKind>, operation: &str) -> DashboardResult<FormKind> {
        kind.ok_or_else(|| DashboardError::Unsupported(format!("{} 不支持{}", D::AREA, operation)))
    }

    fn open_form(&mut self, kind: FormKind, id: i64, action: &str) -> DashboardResult<EditForm> {
        let record = self
            .model
            .state()
            .find(id)
            .cloned()
            .ok_or_else(|| DashboardError::record_not_found(id))?;
        self.select(id, action);
        Ok(EditForm::new(self.context.forms.get(kind), &record))
    }

    /// 保存编辑表单：先本地校验；编号为 0 时新建，否则更新
    pub async fn edit_submit(&mut self, form: &mut EditForm) -> DashboardResult<()> {
        let attributes = form.begin_submit()?;
        let resource = self.resource();
        let created = form.is_new();

        let result = if created {
            self.context.client.create(&resource, &attributes).await
        } else {
            self.context
                .client
                .update(&resource, form.record_id(), &attributes)
                .await
        };

        match result {
            Ok(_) => {
                info!("{} 记录 {} 已保存", D::AREA, form.record_id());
                let message = self.descriptor.saved_message(created);
                self.finish_success(form, message).await
            }
            Err(error) => self.finish_failure(form, error).await,
        }
    }

    pub async fn edit_delete(&mut self, form: &mut EditForm) -> DashboardResult<()> {
        if !self.descriptor.can_delete() {
            return Err(DashboardError::Unsupported(format!("{} 不支持删除", D::AREA)));
        }
        form.begin_delete()?;
        let resource = self.resource();

        match self.context.client.delete(&resource, form.record_id()).await {
            Ok(()) => {
                info!("{} 记录 {} 已删除", D::AREA, form.record_id());
                let message = self.descriptor.deleted_message();
                self.finish_success(form, message).await
            }
            Err(error) => self.finish_failure(form, error).await,
        }
    }

    /// 两阶段信号：先在内存记录上写入新信号，成功确认，失败回滚
    pub async fn signal_submit(&mut self, form: &mut EditForm) -> DashboardResult<()> {
        let attributes = form.begin_submit()?;
        let id = form.record_id();
        let signal = attributes
            .get(SIGNAL_ATTRIBUTE)
            .map(|value| value.to_plain_string())
            .unwrap_or_default();

        if let Some(record) = self.model.find_mut(id) {
            record.begin_signal(&signal);
        }

        let resource = self.resource();
        match self.context.client.signal(&resource, id, &signal).await {
            Ok(()) => {
                if let Some(record) = self.model.find_mut(id) {
                    record.commit_signal();
                }
                info!("{} 记录 {} 已发送信号 {}", D::AREA, id, signal);
                let message = self.descriptor.signalled_message(&signal);
                self.finish_success(form, message).await
            }
            Err(error) => {
                if let Some(record) = self.model.find_mut(id) {
                    record.rollback_signal();
                }
                self.finish_failure(form, error).await
            }
        }
    }

    async fn finish_success(&mut self, form: &mut EditForm, message: String) -> DashboardResult<()> {
        form.complete();
        self.model.clear_selection();
        self.context.notices.success(message);
        self.navigate();
        // 保存已成功，刷新失败只记录
        if let Err(error) = self.fetch().await {
            warn!("{} 保存后刷新列表失败: {}", D::AREA, error);
        }
        Ok(())
    }

    /// 字段级错误留在表单内；其余错误发出通知、清除选择并重新拉取列表
    async fn finish_failure(
        &mut self,
        form: &mut EditForm,
        error: DashboardError,
    ) -> DashboardResult<()> {
        if form.fail(&error) {
            debug!("{} 服务端校验失败: {}", D::AREA, error);
            return Err(error);
        }

        warn!("{} 提交失败: {}", D::AREA, error);
        self.context.notices.error(error.user_message());
        if self.model.clear_selection() {
            self.navigate();
        }
        // 列表拉取失败已经单独通知
        let _ = self.fetch().await;
        Err(error)
    }

    /// 首次打开详情时拉取完整记录，之后不再请求
    pub async fn details(&mut self, id: i64) -> DashboardResult<bool> {
        match self.model.state().find(id) {
            None => return Err(DashboardError::record_not_found(id)),
            Some(record) if record.details_loaded => return Ok(false),
            Some(_) => {}
        }

        let resource = self.resource();
        match self.context.client.get(&resource, id).await {
            Ok(detail) => {
                if let Some(record) = self.model.find_mut(id) {
                    record.merge(detail.attributes().clone());
                    record.details_loaded = true;
                }
                Ok(true)
            }
            Err(error) => {
                warn!("{} 记录 {} 详情拉取失败: {}", D::AREA, id, error);
                self.context.notices.error(error.user_message());
                Err(error)
            }
        }
    }

    /// 翻页：限制在 `[1, page_count]`，页数未知时为 1；页码不变则不拉取
    pub async fn page(&mut self, requested: i64) -> DashboardResult<bool> {
        let state = self.model.state();
        let target = if state.page_count > 0 {
            requested.clamp(1, state.page_count)
        } else {
            1
        };
        if target == state.page_number {
            return Ok(false);
        }

        self.model.set_page_number(target);
        self.navigate();
        self.fetch().await?;
        Ok(true)
    }

    /// 新的搜索总是从第一页开始
    pub async fn search_submit(&mut self, text: &str) -> DashboardResult<()> {
        self.model.set_search(text.trim());
        self.model.set_page_number(1);
        self.navigate();
        self.fetch().await
    }

    pub async fn search_cancel(&mut self) -> DashboardResult<()> {
        self.search_submit("").await
    }

    pub async fn handle_view_event(&mut self, event: ViewEvent) -> DashboardResult<()> {
        match event {
            ViewEvent::Page(page) => self.page(page).await.map(|_| ()),
            ViewEvent::SearchSubmit(text) => self.search_submit(&text).await,
            ViewEvent::SearchCancel => self.search_cancel().await,
        }
    }
}

/// Dashboard 只展示各区域计数
#[derive(Debug)]
pub struct DashboardController {
    context: ControllerContext,
    counts: Option<Counts>,
}

impl DashboardController {
    pub fn new(context: ControllerContext) -> Self {
        Self {
            context,
            counts: None,
        }
    }

    pub fn counts(&self) -> Option<&Counts> {
        self.counts.as_ref()
    }

    pub async fn index(&mut self) -> DashboardResult<Counts> {
        match self.context.client.counts().await {
            Ok(counts) => {
                self.counts = Some(counts);
                self.context.events.publish(&ControllerEvent::Counts(counts));
                Ok(counts)
            }
            Err(error) => {
                warn!("计数拉取失败: {}", error);
                self.context.notices.error(error.user_message());
                Err(error)
            }
        }
    }

    pub fn navigate(&self) {
        self.context.events.publish(&ControllerEvent::Navigate {
            area: Area::Dashboard,
            state: AreaState::default(),
            fragment: String::new(),
        });
    }
}
