//! The Tasks view: stores, filters and selections for one project.
//!
//! State changes only through discrete calls: user actions (`set_search`,
//! `toggle_task`, ...) and fetch/submit completions delivered as
//! [`TasksEvent`]s. Fetches run on spawned tasks and may finish in any order;
//! until they do the stores are simply empty. Once the view is unmounted,
//! late events are dropped instead of applied.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;

use crate::client::{BoardClient, ClientError};
use crate::filter::{self, Choice, TaskFilter, TaskStats};
use crate::mapping::{self, MappingSubmitter};
use crate::models::*;
use crate::selection::SelectionSet;
use crate::session::SessionContext;

/// Completion of an asynchronous operation started by the view.
#[derive(Debug)]
pub enum TasksEvent {
    TasksLoaded(Result<Vec<Task>, ClientError>),
    EmployeesLoaded(Result<Vec<Employee>, ClientError>),
    MappingFinished {
        request: MappingRequest,
        result: Result<MappingAck, ClientError>,
    },
}

/// Failure of a one-shot [`TasksView::map_ids`] run.
#[derive(Debug, Error)]
pub enum MapError {
    #[error("Failed to load project data: {0}")]
    Load(#[source] ClientError),

    #[error("Task #{task} not found in project #{project}")]
    UnknownTask { task: TaskId, project: ProjectId },

    #[error("Team member #{0} not found")]
    UnknownEmployee(EmployeeId),

    #[error("Nothing selected to map")]
    NothingSelected,

    #[error("Mapping failed: {0}")]
    Submit(#[source] ClientError),
}

/// Shared flag telling background work whether the view is still alive.
#[derive(Debug, Clone)]
struct MountToken(Arc<AtomicBool>);

impl MountToken {
    fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    fn is_mounted(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    fn unmount(&self) {
        self.0.store(false, Ordering::Release);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Pending,
    Loaded,
    Failed,
}

pub struct TasksView {
    project_id: ProjectId,
    session: SessionContext,
    mount: MountToken,

    tasks: Vec<Task>,
    employees: Vec<Employee>,
    tasks_state: LoadState,
    employees_state: LoadState,

    filter: TaskFilter,
    team_search: String,
    show_team: bool,

    selected_tasks: SelectionSet<Task>,
    selected_employees: SelectionSet<Employee>,
    submitter: MappingSubmitter,
    submitting: bool,
}

impl TasksView {
    pub fn new(project_id: ProjectId, session: SessionContext, submitter: MappingSubmitter) -> Self {
        Self {
            project_id,
            session,
            mount: MountToken::new(),
            tasks: Vec::new(),
            employees: Vec::new(),
            tasks_state: LoadState::Pending,
            employees_state: LoadState::Pending,
            filter: TaskFilter::default(),
            team_search: String::new(),
            show_team: false,
            selected_tasks: SelectionSet::new(),
            selected_employees: SelectionSet::new(),
            submitter,
            submitting: false,
        }
    }

    pub fn project_id(&self) -> ProjectId {
        self.project_id
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn is_mounted(&self) -> bool {
        self.mount.is_mounted()
    }

    /// Leave the view. Background work keeps running but its results are dropped.
    pub fn unmount(&mut self) {
        tracing::debug!(project = %self.project_id, "tasks view unmounted");
        self.mount.unmount();
    }

    // ============================================================
    // Loading
    // ============================================================

    /// Start both fetches on background tasks, reporting through `tx`.
    pub fn spawn_fetches(&self, client: &BoardClient, tx: &mpsc::UnboundedSender<TasksEvent>) {
        let project_id = self.project_id;

        let (c, t, mount) = (client.clone(), tx.clone(), self.mount.clone());
        tokio::spawn(async move {
            let result = c.get_tasks(project_id).await;
            if mount.is_mounted() {
                let _ = t.send(TasksEvent::TasksLoaded(result));
            }
        });

        let (c, t, mount) = (client.clone(), tx.clone(), self.mount.clone());
        tokio::spawn(async move {
            let result = c.get_employees().await;
            if mount.is_mounted() {
                let _ = t.send(TasksEvent::EmployeesLoaded(result));
            }
        });
    }

    /// Fetch tasks and employees concurrently and apply both results.
    ///
    /// Both results are applied even when one fails; the first failure is
    /// returned (tasks before employees).
    pub async fn load(&mut self, client: &BoardClient) -> Result<(), ClientError> {
        let (tasks, employees) =
            tokio::join!(client.get_tasks(self.project_id), client.get_employees());
        if !self.is_mounted() {
            return Ok(());
        }

        let mut failure = None;
        match tasks {
            Ok(tasks) => self.tasks_loaded(tasks),
            Err(e) => {
                self.tasks_failed(&e);
                failure = Some(e);
            }
        }
        match employees {
            Ok(employees) => self.employees_loaded(employees),
            Err(e) => {
                self.employees_failed(&e);
                failure = failure.or(Some(e));
            }
        }
        failure.map_or(Ok(()), Err)
    }

    fn tasks_loaded(&mut self, tasks: Vec<Task>) {
        tracing::debug!(count = tasks.len(), "tasks loaded");
        self.tasks = tasks;
        self.tasks_state = LoadState::Loaded;
    }

    fn tasks_failed(&mut self, e: &ClientError) {
        tracing::error!(project = %self.project_id, error = %e, "failed to fetch tasks");
        self.session.observe(e);
        self.tasks_state = LoadState::Failed;
    }

    fn employees_loaded(&mut self, employees: Vec<Employee>) {
        tracing::debug!(count = employees.len(), "employees loaded");
        self.employees = employees;
        self.employees_state = LoadState::Loaded;
    }

    fn employees_failed(&mut self, e: &ClientError) {
        tracing::error!(error = %e, "failed to fetch employees");
        self.session.observe(e);
        self.employees_state = LoadState::Failed;
    }

    /// Apply a completed operation. Returns `false` when the view was
    /// unmounted and the event was dropped.
    pub fn apply(&mut self, event: TasksEvent) -> bool {
        if !self.is_mounted() {
            tracing::debug!(?event, "dropping event for unmounted view");
            return false;
        }
        match event {
            TasksEvent::TasksLoaded(Ok(tasks)) => self.tasks_loaded(tasks),
            TasksEvent::TasksLoaded(Err(e)) => self.tasks_failed(&e),
            TasksEvent::EmployeesLoaded(Ok(employees)) => self.employees_loaded(employees),
            TasksEvent::EmployeesLoaded(Err(e)) => self.employees_failed(&e),
            TasksEvent::MappingFinished { request, result } => {
                self.submitting = false;
                if let Err(e) = &result {
                    tracing::error!(error = %e, "task mapping failed");
                    self.session.observe(e);
                } else {
                    tracing::info!("task mapping accepted");
                }
                self.submitter.settle(
                    &request,
                    &result,
                    &mut self.selected_tasks,
                    &mut self.selected_employees,
                );
            }
        }
        true
    }

    pub fn tasks_state(&self) -> LoadState {
        self.tasks_state
    }

    pub fn employees_state(&self) -> LoadState {
        self.employees_state
    }

    // ============================================================
    // Filters
    // ============================================================

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.filter.search = search.into();
    }

    pub fn set_status_filter(&mut self, status: Choice<TaskStatus>) {
        self.filter.status = status;
    }

    pub fn set_priority_filter(&mut self, priority: Choice<Priority>) {
        self.filter.priority = priority;
    }

    pub fn set_team_search(&mut self, search: impl Into<String>) {
        self.team_search = search.into();
    }

    pub fn toggle_team_panel(&mut self) -> bool {
        self.show_team = !self.show_team;
        self.show_team
    }

    pub fn filter(&self) -> &TaskFilter {
        &self.filter
    }

    pub fn team_search(&self) -> &str {
        &self.team_search
    }

    pub fn show_team(&self) -> bool {
        self.show_team
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn employees(&self) -> &[Employee] {
        &self.employees
    }

    pub fn visible_tasks(&self) -> Vec<&Task> {
        filter::filter_tasks(&self.tasks, &self.filter)
    }

    pub fn visible_employees(&self) -> Vec<&Employee> {
        filter::filter_employees(&self.employees, &self.team_search)
    }

    pub fn stats(&self) -> TaskStats {
        TaskStats::of(&self.tasks)
    }

    // ============================================================
    // Selection
    // ============================================================

    /// Toggle the task with `id` from the store. `None` if it isn't loaded.
    pub fn toggle_task(&mut self, id: TaskId) -> Option<bool> {
        let task = self.tasks.iter().find(|t| t.task_id == id)?.clone();
        Some(self.selected_tasks.toggle(task))
    }

    /// Toggle the employee with `id` from the store. `None` if it isn't loaded.
    pub fn toggle_employee(&mut self, id: EmployeeId) -> Option<bool> {
        let employee = self.employees.iter().find(|e| e.employee_id == id)?.clone();
        Some(self.selected_employees.toggle(employee))
    }

    pub fn remove_task(&mut self, id: TaskId) -> bool {
        self.selected_tasks.remove(id)
    }

    pub fn remove_employee(&mut self, id: EmployeeId) -> bool {
        self.selected_employees.remove(id)
    }

    pub fn clear_selections(&mut self) {
        self.selected_tasks.clear();
        self.selected_employees.clear();
    }

    pub fn selected_tasks(&self) -> &SelectionSet<Task> {
        &self.selected_tasks
    }

    pub fn selected_employees(&self) -> &SelectionSet<Employee> {
        &self.selected_employees
    }

    /// Submit is offered whenever either selection is non-empty.
    pub fn can_submit(&self) -> bool {
        !self.submitting && !(self.selected_tasks.is_empty() && self.selected_employees.is_empty())
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    // ============================================================
    // Mapping
    // ============================================================

    /// Submit the current selections and wait for the outcome.
    pub async fn submit(&mut self, client: &BoardClient) -> Result<MappingAck, ClientError> {
        let result = self
            .submitter
            .submit(client, &mut self.selected_tasks, &mut self.selected_employees)
            .await;
        if let Err(e) = &result {
            self.session.observe(e);
        }
        result
    }

    /// Load the project, select the given ids and submit them once.
    ///
    /// The session context reflects any 401/403 seen along the way, whatever
    /// the outcome, so callers should persist it before handling the error.
    pub async fn map_ids(
        &mut self,
        client: &BoardClient,
        task_ids: &[TaskId],
        employee_ids: &[EmployeeId],
    ) -> Result<MappingAck, MapError> {
        if task_ids.is_empty() && employee_ids.is_empty() {
            return Err(MapError::NothingSelected);
        }
        self.load(client).await.map_err(MapError::Load)?;

        for &id in task_ids {
            if !self.selected_tasks.contains(id) && self.toggle_task(id).is_none() {
                return Err(MapError::UnknownTask {
                    task: id,
                    project: self.project_id,
                });
            }
        }
        for &id in employee_ids {
            if !self.selected_employees.contains(id) && self.toggle_employee(id).is_none() {
                return Err(MapError::UnknownEmployee(id));
            }
        }

        self.submit(client).await.map_err(MapError::Submit)
    }

    /// Start a submission on a background task; the outcome arrives as
    /// [`TasksEvent::MappingFinished`]. Returns the request that was sent.
    pub fn spawn_submit(
        &mut self,
        client: &BoardClient,
        tx: &mpsc::UnboundedSender<TasksEvent>,
    ) -> Option<MappingRequest> {
        if !self.can_submit() {
            return None;
        }
        self.submitting = true;
        let request = mapping::build_request(&self.selected_tasks, &self.selected_employees);

        let (c, t, mount, body) = (client.clone(), tx.clone(), self.mount.clone(), request.clone());
        tokio::spawn(async move {
            let result = c.map_tasks(&body).await;
            if mount.is_mounted() {
                let _ = t.send(TasksEvent::MappingFinished {
                    request: body,
                    result,
                });
            }
        });
        Some(request)
    }
}
