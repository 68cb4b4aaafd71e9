//! In-process store used by the test suite. Mirrors the ordering and
//! ownership rules of the MySQL store.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};

use super::{RecordStore, UserStore, day_window};
use crate::error::{AppError, Result};
use crate::model::{
    attendance_record::{AttendanceRecord, NewRecord, RecordPatch, RecordWithUser},
    user::{NewUser, User, UserPatch},
};

#[derive(Default)]
struct State {
    records: Vec<AttendanceRecord>,
    users: Vec<User>,
    next_record_id: u64,
    next_user_id: u64,
}

impl State {
    fn joined(&self, keep: impl Fn(&AttendanceRecord, &User) -> bool) -> Vec<RecordWithUser> {
        self.records
            .iter()
            .filter_map(|record| {
                let user = self.users.iter().find(|u| u.id == record.user_id)?;
                keep(record, user).then(|| RecordWithUser {
                    record: record.clone(),
                    user: user.clone(),
                })
            })
            .collect()
    }
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_count(&self) -> usize {
        self.state.lock().unwrap().records.len()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn create(&self, record: NewRecord) -> Result<AttendanceRecord> {
        let mut state = self.state.lock().unwrap();
        state.next_record_id += 1;

        let now = Utc::now();
        let stored = AttendanceRecord {
            id: state.next_record_id,
            user_id: record.user_id,
            clock_in_time: record.clock_in_time,
            clock_out_time: record.clock_out_time,
            created_at: now,
            updated_at: now,
        };
        state.records.push(stored.clone());

        Ok(stored)
    }

    async fn get_by_date(
        &self,
        user_id: u64,
        date: DateTime<FixedOffset>,
    ) -> Result<AttendanceRecord> {
        let window = day_window(date);
        let state = self.state.lock().unwrap();

        state
            .records
            .iter()
            .find(|r| r.user_id == user_id && window.contains(r.clock_in_time))
            .cloned()
            .ok_or_else(|| AppError::not_found("attendance record"))
    }

    async fn get_by_id(&self, user_id: u64, record_id: u64) -> Result<AttendanceRecord> {
        let state = self.state.lock().unwrap();

        state
            .records
            .iter()
            .find(|r| r.user_id == user_id && r.id == record_id)
            .cloned()
            .ok_or_else(|| AppError::not_found("attendance record"))
    }

    async fn get_all(&self, user_id: u64) -> Result<Vec<AttendanceRecord>> {
        let state = self.state.lock().unwrap();

        let mut records: Vec<_> = state
            .records
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        records.sort_by_key(|r| (r.created_at, r.id));

        Ok(records)
    }

    async fn get_all_by_date(&self, date: DateTime<FixedOffset>) -> Result<Vec<RecordWithUser>> {
        let window = day_window(date);
        let state = self.state.lock().unwrap();

        Ok(state.joined(|record, _| window.contains(record.clock_in_time)))
    }

    async fn get_all_by_department(&self, department: &str) -> Result<Vec<RecordWithUser>> {
        let state = self.state.lock().unwrap();

        Ok(state.joined(|_, user| user.department == department))
    }

    async fn get_all_by_date_and_department(
        &self,
        date: DateTime<FixedOffset>,
        department: &str,
    ) -> Result<Vec<RecordWithUser>> {
        let window = day_window(date);
        let state = self.state.lock().unwrap();

        Ok(state.joined(|record, user| {
            window.contains(record.clock_in_time) && user.department == department
        }))
    }

    async fn get_all_users(&self) -> Result<Vec<User>> {
        let state = self.state.lock().unwrap();

        let mut users = state.users.clone();
        users.sort_by_key(|u| u.id);

        Ok(users)
    }

    async fn update(
        &self,
        patch: RecordPatch,
        user_id: u64,
        record_id: u64,
    ) -> Result<AttendanceRecord> {
        let mut state = self.state.lock().unwrap();

        let record = state
            .records
            .iter_mut()
            .find(|r| r.user_id == user_id && r.id == record_id)
            .ok_or_else(|| AppError::not_found("attendance record"))?;

        if let Some(clock_in_time) = patch.clock_in_time {
            record.clock_in_time = clock_in_time;
        }
        if let Some(clock_out_time) = patch.clock_out_time {
            record.clock_out_time = Some(clock_out_time);
        }
        record.updated_at = Utc::now();

        Ok(record.clone())
    }

    async fn delete(&self, user_id: u64, record_id: u64) -> Result<()> {
        let mut state = self.state.lock().unwrap();

        let before = state.records.len();
        state
            .records
            .retain(|r| !(r.user_id == user_id && r.id == record_id));

        if state.records.len() == before {
            return Err(AppError::not_found("attendance record"));
        }

        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<User> {
        let mut state = self.state.lock().unwrap();

        if state.users.iter().any(|u| u.email == user.email) {
            return Err(AppError::Conflict("email is already in use".to_string()));
        }

        state.next_user_id += 1;
        let now = Utc::now();
        let stored = User {
            id: state.next_user_id,
            email: user.email,
            password: user.password,
            department: user.department,
            name: user.name,
            role: user.role,
            created_at: now,
            updated_at: now,
        };
        state.users.push(stored.clone());

        Ok(stored)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<User> {
        let state = self.state.lock().unwrap();

        state
            .users
            .iter()
            .find(|u| u.email == email)
            .cloned()
            .ok_or_else(|| AppError::not_found("user"))
    }

    async fn get_user_by_id(&self, user_id: u64) -> Result<User> {
        let state = self.state.lock().unwrap();

        state
            .users
            .iter()
            .find(|u| u.id == user_id)
            .cloned()
            .ok_or_else(|| AppError::not_found("user"))
    }

    async fn update_user(&self, user_id: u64, patch: UserPatch) -> Result<User> {
        let mut state = self.state.lock().unwrap();

        let user = state
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or_else(|| AppError::not_found("user"))?;

        if let Some(department) = patch.department {
            user.department = department;
        }
        if let Some(name) = patch.name {
            user.name = name;
        }
        user.updated_at = Utc::now();

        Ok(user.clone())
    }

    async fn delete_user(&self, user_id: u64) -> Result<()> {
        let mut state = self.state.lock().unwrap();

        if !state.users.iter().any(|u| u.id == user_id) {
            return Err(AppError::not_found("user"));
        }

        state.records.retain(|r| r.user_id != user_id);
        state.users.retain(|u| u.id != user_id);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::role::Role;
    use crate::store::date_at_utc_midnight;
    use chrono::{NaiveDate, TimeZone};

    fn at(h: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, d, h, 0, 0).unwrap()
    }

    fn day(d: u32) -> DateTime<FixedOffset> {
        date_at_utc_midnight(NaiveDate::from_ymd_opt(2024, 1, d).unwrap())
    }

    async fn user(store: &MemoryStore, email: &str, department: &str) -> User {
        store
            .create_user(NewUser {
                email: email.to_string(),
                password: "hash".to_string(),
                department: department.to_string(),
                name: email.to_string(),
                role: Role::Employee,
            })
            .await
            .unwrap()
    }

    async fn record(store: &MemoryStore, user_id: u64, clock_in: DateTime<Utc>) -> AttendanceRecord {
        store
            .create(NewRecord {
                user_id,
                clock_in_time: clock_in,
                clock_out_time: None,
            })
            .await
            .unwrap()
    }

    #[actix_web::test]
    async fn create_then_get_by_id_round_trips() {
        let store = MemoryStore::new();
        let alice = user(&store, "alice@example.com", "sales").await;
        let created = record(&store, alice.id, at(9, 5)).await;

        let fetched = store.get_by_id(alice.id, created.id).await.unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.clock_in_time, at(9, 5));
        assert_eq!(fetched.clock_out_time, None);
    }

    #[actix_web::test]
    async fn get_by_date_only_sees_the_owners_day() {
        let store = MemoryStore::new();
        let alice = user(&store, "alice@example.com", "sales").await;
        let bob = user(&store, "bob@example.com", "sales").await;
        record(&store, bob.id, at(9, 5)).await;
        record(&store, alice.id, at(23, 4)).await;
        let wanted = record(&store, alice.id, at(0, 5)).await;

        let found = store.get_by_date(alice.id, day(5)).await.unwrap();
        assert_eq!(found.id, wanted.id);

        assert_eq!(
            store.get_by_date(alice.id, day(6)).await,
            Err(AppError::not_found("attendance record"))
        );
    }

    #[actix_web::test]
    async fn update_and_delete_are_scoped_to_the_owner() {
        let store = MemoryStore::new();
        let alice = user(&store, "alice@example.com", "sales").await;
        let bob = user(&store, "bob@example.com", "sales").await;
        let alices = record(&store, alice.id, at(9, 5)).await;

        let patch = RecordPatch {
            clock_in_time: None,
            clock_out_time: Some(at(17, 5)),
        };
        assert!(matches!(
            store.update(patch, bob.id, alices.id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            store.delete(bob.id, alices.id).await,
            Err(AppError::NotFound(_))
        ));

        let untouched = store.get_by_id(alice.id, alices.id).await.unwrap();
        assert_eq!(untouched.clock_out_time, None);
    }

    #[actix_web::test]
    async fn admin_filters_join_users() {
        let store = MemoryStore::new();
        let alice = user(&store, "alice@example.com", "sales").await;
        let bob = user(&store, "bob@example.com", "ops").await;
        record(&store, alice.id, at(9, 5)).await;
        record(&store, bob.id, at(9, 5)).await;
        record(&store, alice.id, at(9, 6)).await;

        assert_eq!(store.get_all_by_date(day(5)).await.unwrap().len(), 2);
        assert_eq!(store.get_all_by_department("sales").await.unwrap().len(), 2);

        let both = store
            .get_all_by_date_and_department(day(5), "ops")
            .await
            .unwrap();
        assert_eq!(both.len(), 1);
        assert_eq!(both[0].user.email, "bob@example.com");
    }

    #[actix_web::test]
    async fn deleting_a_user_cascades_to_records() {
        let store = MemoryStore::new();
        let alice = user(&store, "alice@example.com", "sales").await;
        record(&store, alice.id, at(9, 5)).await;

        store.delete_user(alice.id).await.unwrap();

        assert_eq!(store.record_count(), 0);
        assert!(store.get_user_by_id(alice.id).await.is_err());
    }

    #[actix_web::test]
    async fn duplicate_email_conflicts() {
        let store = MemoryStore::new();
        user(&store, "alice@example.com", "sales").await;

        let again = store
            .create_user(NewUser {
                email: "alice@example.com".to_string(),
                password: "hash".to_string(),
                department: String::new(),
                name: String::new(),
                role: Role::Employee,
            })
            .await;
        assert!(matches!(again, Err(AppError::Conflict(_))));
    }
}
