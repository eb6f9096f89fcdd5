use crate::api::dto::EmployeeDto;
use crate::database::models::employee::Employee;
use crate::security::sanitizer::InvalidInput;

pub fn to_dto(employee: &Employee) -> EmployeeDto {
    EmployeeDto {
        id: employee.id(),
        name: Some(employee.name().to_string()),
        role: Some(employee.role().to_string()),
    }
}

pub fn to_dto_list(employees: &[Employee]) -> Vec<EmployeeDto> {
    employees.iter().map(to_dto).collect()
}

/// Builds a new, unsaved entity. Any id in the DTO is ignored.
pub fn to_entity(dto: &EmployeeDto) -> Result<Employee, InvalidInput> {
    Employee::new(dto.name.as_deref(), dto.role.as_deref())
}

/// Applies the fields present in `dto`. Either every present field is
/// applied or the entity is left untouched.
pub fn update_entity_from_dto(employee: &mut Employee, dto: &EmployeeDto) -> Result<(), InvalidInput> {
    let mut updated = employee.clone();
    if let Some(name) = dto.name.as_deref() {
        updated.set_name(Some(name))?;
    }
    if let Some(role) = dto.role.as_deref() {
        updated.set_role(Some(role))?;
    }
    *employee = updated;
    Ok(())
}
