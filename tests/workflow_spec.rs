use speculate2::speculate;
use taskmap::filter::{self, Choice, ProjectFilter, ProjectSort, TaskFilter, TaskStats};
use taskmap::mapping::{self, ClearPolicy, MappingSubmitter};
use taskmap::models::*;
use taskmap::selection::SelectionSet;

fn task(id: i64, title: &str, description: &str, status: &str, priority: &str) -> Task {
    serde_json::from_value(serde_json::json!({
        "taskId": id,
        "taskTitle": title,
        "description": description,
        "status": status,
        "priority": priority,
        "dueDate": "2024-03-05",
    }))
    .expect("Failed to build task")
}

fn employee(id: i64, first_name: &str) -> Employee {
    serde_json::from_value(serde_json::json!({
        "employeeId": id,
        "firstName": first_name,
        "email": format!("{}@example.com", first_name.to_lowercase()),
    }))
    .expect("Failed to build employee")
}

fn project(id: i64, name: &str, status: &str, priority: &str, progress: u32, due: Option<&str>) -> Project {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "projectName": name,
        "projectDesc": format!("{} description", name),
        "status": status,
        "priority": priority,
        "progress": progress,
        "dueDate": due,
    }))
    .expect("Failed to build project")
}

fn ids(tasks: &[&Task]) -> Vec<i64> {
    tasks.iter().map(|t| t.task_id.0).collect()
}

speculate! {
    before {
        // Project 42
        let tasks = vec![
            task(1, "Design login page", "Mockups for auth", "todo", "high"),
            task(2, "Ship checkout", "Payment flow", "completed", "medium"),
            task(3, "Fix login redirect", "Bug after auth", "in-progress", "high"),
            task(4, "Write docs", "API reference", "blocked", "low"),
        ];
        let employees = vec![employee(1, "Anna"), employee(2, "Bob"), employee(3, "Joanna")];
    }

    describe "task filtering" {
        it "returns every task with default criteria" {
            let visible = filter::filter_tasks(&tasks, &TaskFilter::default());
            assert_eq!(ids(&visible), vec![1, 2, 3, 4]);
        }

        it "narrows by status" {
            let criteria = TaskFilter {
                status: Choice::Only(TaskStatus::Completed),
                ..TaskFilter::default()
            };
            assert_eq!(ids(&filter::filter_tasks(&tasks, &criteria)), vec![2]);
        }

        it "matches search text in title or description, ignoring case" {
            let criteria = TaskFilter {
                search: "LOGIN".to_string(),
                ..TaskFilter::default()
            };
            assert_eq!(ids(&filter::filter_tasks(&tasks, &criteria)), vec![1, 3]);

            let criteria = TaskFilter {
                search: "auth".to_string(),
                ..TaskFilter::default()
            };
            assert_eq!(ids(&filter::filter_tasks(&tasks, &criteria)), vec![1, 3]);
        }

        it "combines all criteria" {
            let criteria = TaskFilter {
                search: "login".to_string(),
                status: Choice::Only(TaskStatus::InProgress),
                priority: Choice::Only(Priority::High),
            };
            assert_eq!(ids(&filter::filter_tasks(&tasks, &criteria)), vec![3]);
        }

        it "returns nothing when no task matches" {
            let criteria = TaskFilter {
                priority: Choice::Only(Priority::Low),
                status: Choice::Only(TaskStatus::Todo),
                ..TaskFilter::default()
            };
            assert!(filter::filter_tasks(&tasks, &criteria).is_empty());
        }

        it "counts statuses over the whole store" {
            let stats = TaskStats::of(&tasks);
            assert_eq!(stats.total, 4);
            assert_eq!(stats.todo, 1);
            assert_eq!(stats.in_progress, 1);
            assert_eq!(stats.completed, 1);
        }
    }

    describe "employee filtering" {
        it "matches first names case-insensitively" {
            let two = vec![employee(1, "Anna"), employee(2, "Bob")];
            let visible = filter::filter_employees(&two, "ann");
            assert_eq!(visible.len(), 1);
            assert_eq!(visible[0].first_name, "Anna");
        }

        it "matches anywhere in the name" {
            let visible = filter::filter_employees(&employees, "ANNA");
            let names: Vec<&str> = visible.iter().map(|e| e.first_name.as_str()).collect();
            assert_eq!(names, vec!["Anna", "Joanna"]);
        }

        it "returns everyone for an empty search" {
            assert_eq!(filter::filter_employees(&employees, "").len(), 3);
        }

        it "ignores email addresses" {
            assert!(filter::filter_employees(&employees, "example.com").is_empty());
        }
    }

    describe "selection sets" {
        it "toggling twice leaves the set unchanged" {
            let mut selected = SelectionSet::new();
            assert!(selected.toggle(tasks[0].clone()));
            assert!(!selected.toggle(tasks[0].clone()));
            assert!(selected.is_empty());
        }

        it "keeps insertion order" {
            let mut selected = SelectionSet::new();
            selected.toggle(tasks[2].clone());
            selected.toggle(tasks[0].clone());
            selected.toggle(tasks[1].clone());
            assert_eq!(selected.ids(), vec![TaskId(3), TaskId(1), TaskId(2)]);
        }

        it "re-selecting moves an entity to the end" {
            let mut selected = SelectionSet::new();
            selected.toggle(employees[0].clone());
            selected.toggle(employees[1].clone());
            selected.toggle(employees[0].clone());
            selected.toggle(employees[0].clone());
            assert_eq!(selected.ids(), vec![EmployeeId(2), EmployeeId(1)]);
        }

        it "removing an absent id is a no-op" {
            let mut selected = SelectionSet::new();
            selected.toggle(employees[0].clone());
            assert!(!selected.remove(EmployeeId(99)));
            assert_eq!(selected.len(), 1);
            assert!(selected.remove(EmployeeId(1)));
            assert!(selected.is_empty());
        }

        it "clear empties the set" {
            let mut selected = SelectionSet::new();
            for t in &tasks {
                selected.toggle(t.clone());
            }
            assert_eq!(selected.len(), 4);
            selected.clear();
            assert!(selected.is_empty());
            assert!(!selected.contains(TaskId(1)));
        }
    }

    describe "mapping requests" {
        it "projects selections to id lists" {
            let mut selected_tasks = SelectionSet::new();
            let mut selected_employees = SelectionSet::new();
            selected_tasks.toggle(tasks[0].clone());
            selected_employees.toggle(employees[0].clone());
            selected_employees.toggle(employees[1].clone());

            let request = mapping::build_request(&selected_tasks, &selected_employees);
            assert_eq!(
                serde_json::to_value(&request).unwrap(),
                serde_json::json!({ "empId": [1, 2], "taskId": [1] })
            );
        }

        it "allows one empty side" {
            let mut selected_tasks = SelectionSet::new();
            selected_tasks.toggle(tasks[3].clone());
            let request = mapping::build_request(&selected_tasks, &SelectionSet::new());
            assert!(request.employee_ids.is_empty());
            assert!(!request.is_empty());
        }

        it "keeps selections after a failure by default" {
            let submitter = MappingSubmitter::default();
            assert_eq!(submitter.policy(), ClearPolicy::OnSuccess);

            let mut selected_tasks = SelectionSet::new();
            let mut selected_employees = SelectionSet::new();
            selected_tasks.toggle(tasks[0].clone());
            selected_employees.toggle(employees[0].clone());

            let request = mapping::build_request(&selected_tasks, &selected_employees);
            let failed: Result<(), taskmap::client::ClientError> =
                Err(taskmap::client::ClientError::Server("500".into()));
            submitter.settle(&request, &failed, &mut selected_tasks, &mut selected_employees);
            assert_eq!(selected_tasks.len(), 1);
            assert_eq!(selected_employees.len(), 1);

            submitter.settle(&request, &Ok::<(), _>(()), &mut selected_tasks, &mut selected_employees);
            assert!(selected_tasks.is_empty());
            assert!(selected_employees.is_empty());
        }

        it "clears after a failure under the always policy" {
            let submitter = MappingSubmitter::new(ClearPolicy::Always);
            let mut selected_tasks = SelectionSet::new();
            let mut selected_employees = SelectionSet::new();
            selected_tasks.toggle(tasks[0].clone());
            let request = mapping::build_request(&selected_tasks, &selected_employees);

            let failed: Result<(), taskmap::client::ClientError> =
                Err(taskmap::client::ClientError::Forbidden);
            submitter.settle(&request, &failed, &mut selected_tasks, &mut selected_employees);
            assert!(selected_tasks.is_empty());
        }

        it "only clears the ids that were submitted" {
            let submitter = MappingSubmitter::new(ClearPolicy::Always);
            let mut selected_tasks = SelectionSet::new();
            let mut selected_employees = SelectionSet::new();
            selected_tasks.toggle(tasks[0].clone());
            selected_employees.toggle(employees[0].clone());
            let request = mapping::build_request(&selected_tasks, &selected_employees);

            selected_tasks.toggle(tasks[1].clone());
            selected_employees.toggle(employees[2].clone());

            let failed: Result<(), taskmap::client::ClientError> =
                Err(taskmap::client::ClientError::Server("502".into()));
            submitter.settle(&request, &failed, &mut selected_tasks, &mut selected_employees);
            assert_eq!(selected_tasks.ids(), vec![TaskId(2)]);
            assert_eq!(selected_employees.ids(), vec![EmployeeId(3)]);
        }
    }

    describe "project listing" {
        before {
            let projects = vec![
                project(1, "Website", "In progress", "medium", 40, Some("2024-06-01")),
                project(2, "Apollo", "planning", "high", 10, None),
                project(3, "Mobile app", "completed", "low", 100, Some("2024-01-15")),
            ];
        }

        it "sorts by name by default" {
            let visible = filter::filter_projects(&projects, &ProjectFilter::default());
            let names: Vec<&str> = visible.iter().map(|p| p.project_name.as_str()).collect();
            assert_eq!(names, vec!["Apollo", "Mobile app", "Website"]);
        }

        it "sorts names without regard to case" {
            let mixed = vec![
                project(1, "Zeta", "planning", "low", 0, None),
                project(2, "apple", "planning", "low", 0, None),
                project(3, "Mango", "planning", "low", 0, None),
            ];
            let visible = filter::filter_projects(&mixed, &ProjectFilter::default());
            let names: Vec<&str> = visible.iter().map(|p| p.project_name.as_str()).collect();
            assert_eq!(names, vec!["apple", "Mango", "Zeta"]);
        }

        it "sorts by due date with undated projects last" {
            let criteria = ProjectFilter { sort: ProjectSort::DueDate, ..ProjectFilter::default() };
            let visible = filter::filter_projects(&projects, &criteria);
            assert_eq!(visible.iter().map(|p| p.id.0).collect::<Vec<_>>(), vec![3, 1, 2]);
        }

        it "sorts by progress and priority descending" {
            let criteria = ProjectFilter { sort: ProjectSort::Progress, ..ProjectFilter::default() };
            let visible = filter::filter_projects(&projects, &criteria);
            assert_eq!(visible.iter().map(|p| p.id.0).collect::<Vec<_>>(), vec![3, 1, 2]);

            let criteria = ProjectFilter { sort: ProjectSort::Priority, ..ProjectFilter::default() };
            let visible = filter::filter_projects(&projects, &criteria);
            assert_eq!(visible.iter().map(|p| p.id.0).collect::<Vec<_>>(), vec![2, 1, 3]);
        }

        it "filters by status and search text" {
            let criteria = ProjectFilter {
                status: Choice::Only(ProjectStatus::InProgress),
                ..ProjectFilter::default()
            };
            let visible = filter::filter_projects(&projects, &criteria);
            assert_eq!(visible.len(), 1);
            assert_eq!(visible[0].project_name, "Website");

            let criteria = ProjectFilter { search: "mobile".to_string(), ..ProjectFilter::default() };
            assert_eq!(filter::filter_projects(&projects, &criteria)[0].id, ProjectId(3));
        }
    }
}
