/// Demo company database: three departments and eight employees.
pub const DEMO_SQL: &str = "
DROP TABLE IF EXISTS employees;
DROP TABLE IF EXISTS departments;

CREATE TABLE departments (
    id          INTEGER PRIMARY KEY,
    name        TEXT NOT NULL UNIQUE,
    location    TEXT NOT NULL
);

CREATE TABLE employees (
    id              INTEGER PRIMARY KEY,
    name            TEXT NOT NULL,
    email           TEXT NOT NULL UNIQUE,
    department_id   INTEGER NOT NULL REFERENCES departments(id),
    salary          REAL NOT NULL,
    hired_on        TEXT NOT NULL
);

INSERT INTO departments (id, name, location) VALUES
    (1, 'Engineering', 'Berlin'),
    (2, 'Sales', 'London'),
    (3, 'Finance', 'New York');

INSERT INTO employees (id, name, email, department_id, salary, hired_on) VALUES
    (1, 'Alice Martin', 'alice@example.com', 1, 98000.0, '2019-03-04'),
    (2, 'Bob Chen', 'bob@example.com', 1, 91000.0, '2020-07-15'),
    (3, 'Carla Diaz', 'carla@example.com', 1, 105000.0, '2017-11-01'),
    (4, 'Dan Okafor', 'dan@example.com', 2, 67000.0, '2021-01-11'),
    (5, 'Eva Novak', 'eva@example.com', 2, 72000.0, '2018-05-23'),
    (6, 'Farid Haddad', 'farid@example.com', 2, 64000.0, '2022-09-30'),
    (7, 'Grace Kim', 'grace@example.com', 3, 88000.0, '2016-02-14'),
    (8, 'Hugo Laurent', 'hugo@example.com', 3, 79000.0, '2023-04-03');
";
