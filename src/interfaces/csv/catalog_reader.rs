use crate::domain::course::{Course, CourseStatus};
use crate::domain::ids::{CourseId, UserId};
use crate::domain::money::Price;
use crate::domain::student::Student;
use crate::error::{PaymentError, Result};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::io::Read;

/// One row of a course seed file: `id,name,price,status,instructor`.
#[derive(Debug, Deserialize)]
struct CourseRow {
    id: CourseId,
    name: String,
    price: Price,
    status: CourseStatus,
    #[serde(default)]
    instructor: Option<UserId>,
}

impl From<CourseRow> for Course {
    fn from(row: CourseRow) -> Self {
        let mut course = Course::new(row.id, row.name, row.price);
        course.status = row.status;
        if let Some(instructor) = row.instructor {
            course.instructor = instructor;
        }
        course
    }
}

/// One row of a student seed file: `id,email,first_name,last_name`.
#[derive(Debug, Deserialize)]
struct StudentRow {
    id: UserId,
    email: String,
    first_name: String,
    last_name: String,
}

impl From<StudentRow> for Student {
    fn from(row: StudentRow) -> Self {
        Student::new(row.id, row.email, row.first_name, row.last_name)
    }
}

/// Reads seed records from a CSV source.
///
/// Wraps `csv::Reader` with whitespace trimming and flexible record lengths,
/// and yields one `Result` per row so a bad line does not stop the load.
pub struct CatalogReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CatalogReader<R> {
    /// Creates a new `CatalogReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    pub fn courses(self) -> impl Iterator<Item = Result<Course>> {
        self.rows::<CourseRow>().map(|row| row.map(Course::from))
    }

    pub fn students(self) -> impl Iterator<Item = Result<Student>> {
        self.rows::<StudentRow>().map(|row| row.map(Student::from))
    }

    fn rows<T: DeserializeOwned>(self) -> impl Iterator<Item = Result<T>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(PaymentError::from))
    }
}
