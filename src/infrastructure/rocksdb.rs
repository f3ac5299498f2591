use crate::domain::course::Course;
use crate::domain::enrollment::{EnrollmentOutcome, apply_enrollment};
use crate::domain::ids::{CourseId, ProgressId, UserId};
use crate::domain::ports::{CourseStore, EnrollmentStore, StudentStore};
use crate::domain::progress::ProgressRecord;
use crate::domain::student::Student;
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, Options, WriteBatch};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Column Family for course documents.
pub const CF_COURSES: &str = "courses";
/// Column Family for student documents.
pub const CF_STUDENTS: &str = "students";
/// Column Family for progress records.
pub const CF_PROGRESS: &str = "progress";

/// A persistent store implementation using RocksDB.
///
/// Courses, students and progress records live in separate Column Families,
/// keyed by their id and stored as JSON. Enrollment writes all three documents
/// in a single `WriteBatch` while holding a process-wide mutex, which makes the
/// read-modify-write atomic and keyed by (student, course).
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    write_lock: Arc<Mutex<()>>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the required column families exist.
    ///
    /// # Arguments
    ///
    /// * `path` - The filesystem path where the database will be stored.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cfs = [CF_COURSES, CF_STUDENTS, CF_PROGRESS]
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect::<Vec<_>>();

        let db = DB::open_cf_descriptors(&opts, path, cfs)?;

        Ok(Self {
            db: Arc::new(db),
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    fn cf(&self, name: &str) -> Result<&rocksdb::ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| PaymentError::internal(format!("{name} column family not found")))
    }

    fn read<T: DeserializeOwned>(&self, cf_name: &str, key: &str) -> Result<Option<T>> {
        let cf = self.cf(cf_name)?;
        match self.db.get_cf(cf, key.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn write<T: Serialize>(&self, cf_name: &str, key: &str, value: &T) -> Result<()> {
        let cf = self.cf(cf_name)?;
        let bytes = serde_json::to_vec(value)?;
        self.db.put_cf(cf, key.as_bytes(), bytes)?;
        Ok(())
    }
}

#[async_trait]
impl CourseStore for RocksDBStore {
    async fn store(&self, course: Course) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.write(CF_COURSES, course.id.as_str(), &course)
    }

    async fn get(&self, course_id: &CourseId) -> Result<Option<Course>> {
        self.read(CF_COURSES, course_id.as_str())
    }

    async fn remove(&self, course_id: &CourseId) -> Result<Option<Course>> {
        let _guard = self.write_lock.lock().await;
        let existing = self.read(CF_COURSES, course_id.as_str())?;
        if existing.is_some() {
            let cf = self.cf(CF_COURSES)?;
            self.db.delete_cf(cf, course_id.as_str().as_bytes())?;
        }
        Ok(existing)
    }

    async fn all_courses(&self) -> Result<Vec<Course>> {
        let cf = self.cf(CF_COURSES)?;
        let mut courses = Vec::new();
        for item in self.db.iterator_cf(cf, rocksdb::IteratorMode::Start) {
            let (_key, value) = item?;
            courses.push(serde_json::from_slice(&value)?);
        }
        Ok(courses)
    }
}

#[async_trait]
impl StudentStore for RocksDBStore {
    async fn store(&self, student: Student) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.write(CF_STUDENTS, student.id.as_str(), &student)
    }

    async fn get(&self, student_id: &UserId) -> Result<Option<Student>> {
        self.read(CF_STUDENTS, student_id.as_str())
    }
}

#[async_trait]
impl EnrollmentStore for RocksDBStore {
    async fn enroll(
        &self,
        student_id: &UserId,
        course_id: &CourseId,
    ) -> Result<EnrollmentOutcome> {
        let _guard = self.write_lock.lock().await;

        let mut student: Student = self
            .read(CF_STUDENTS, student_id.as_str())?
            .ok_or_else(|| PaymentError::StudentNotFound(student_id.clone()))?;
        let mut course: Course = self
            .read(CF_COURSES, course_id.as_str())?
            .ok_or_else(|| PaymentError::CourseNotFound(course_id.clone()))?;

        let members_before = course.students_enrolled.len();
        let (outcome, progress) = apply_enrollment(&mut course, &mut student);

        let mut batch = WriteBatch::default();
        if course.students_enrolled.len() != members_before {
            batch.put_cf(
                self.cf(CF_COURSES)?,
                course.id.as_str().as_bytes(),
                serde_json::to_vec(&course)?,
            );
        }
        if let Some(progress) = progress {
            batch.put_cf(
                self.cf(CF_PROGRESS)?,
                progress.id.as_str().as_bytes(),
                serde_json::to_vec(&progress)?,
            );
            batch.put_cf(
                self.cf(CF_STUDENTS)?,
                student.id.as_str().as_bytes(),
                serde_json::to_vec(&student)?,
            );
        }
        if !batch.is_empty() {
            self.db.write(&batch)?;
        }

        Ok(outcome)
    }

    async fn progress(&self, progress_id: &ProgressId) -> Result<Option<ProgressRecord>> {
        self.read(CF_PROGRESS, progress_id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::money::Price;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_rocksdb_open_cf() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).expect("Failed to open RocksDB");

        assert!(store.db.cf_handle(CF_COURSES).is_some());
        assert!(store.db.cf_handle(CF_STUDENTS).is_some());
        assert!(store.db.cf_handle(CF_PROGRESS).is_some());
    }

    #[tokio::test]
    async fn test_rocksdb_course_store() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).unwrap();

        let course = Course::new("c1", "Rust 101", Price(500)).published();
        CourseStore::store(&store, course.clone()).await.unwrap();

        let retrieved = CourseStore::get(&store, &CourseId::from("c1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(retrieved, course);
        assert_eq!(store.all_courses().await.unwrap(), vec![course]);

        store.remove(&CourseId::from("c1")).await.unwrap();
        assert!(
            CourseStore::get(&store, &CourseId::from("c1"))
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_rocksdb_enroll_is_atomic_and_idempotent() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).unwrap();
        CourseStore::store(&store, Course::new("c1", "Rust 101", Price(500)).published())
            .await
            .unwrap();
        StudentStore::store(&store, Student::new("u1", "ada@example.com", "Ada", "Lovelace"))
            .await
            .unwrap();

        let student_id = UserId::from("u1");
        let course_id = CourseId::from("c1");
        let first = store.enroll(&student_id, &course_id).await.unwrap();
        let second = store.enroll(&student_id, &course_id).await.unwrap();
        assert!(first.is_new());
        assert!(!second.is_new());

        let student = StudentStore::get(&store, &student_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(student.enrollments.len(), 1);
        let progress_id = student.progress_for(&course_id).unwrap();
        assert!(store.progress(progress_id).await.unwrap().is_some());

        let course = CourseStore::get(&store, &course_id).await.unwrap().unwrap();
        assert_eq!(course.students_enrolled.len(), 1);
    }
}
