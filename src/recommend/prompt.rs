use super::models::RankedCandidate;


/// Fixed routing hints for the bank's category names.
const SELECTION_RULES: &str = r#"Правила выбора:
- Вопросы об открытии первого счёта, регистрации, первом входе в приложение и документах для нового клиента относятся к категории новых клиентов.
- Ставки, открытие, пополнение и закрытие вкладов и накопительных счетов относятся к вкладам.
- Выпуск, блокировка, лимиты, кэшбэк и ПИН-код банковских карт относятся к картам.
- Кредиты, ипотека, рассрочка, досрочное погашение и кредитные лимиты относятся к кредитованию.
- Ошибки приложения, проблемы со входом, СМС-коды и сбои платежей относятся к технической поддержке.
- Общие вопросы о банке и обслуживании частных клиентов относятся к общим вопросам / частным клиентам.
- Если ни одна категория не подходит, ответь -1."#;


fn numbered(values: &[String]) -> String {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| format!("{i}. {v}"))
        .collect::<Vec<_>>()
        .join("\n")
}


pub fn build_category_prompt(categories: &[String]) -> String {
    format!(
        r#"Ты классифицируешь обращения клиентов банка по категориям.

Категории (номер. название):
{list}

{SELECTION_RULES}

Ответь ровно одним целым числом: номером подходящей категории от 0 до {last}, либо -1.
Никакого другого текста."#,
        list = numbered(categories),
        last = categories.len().saturating_sub(1),
    )
}


pub fn build_entities_prompt(main_categories: &[String], target_audiences: &[String]) -> String {
    format!(
        r#"Ты классифицируешь обращения клиентов банка по категории и целевой аудитории.

Список 1, категории (номер. название):
{categories}

Список 2, целевая аудитория (номер. название):
{audiences}

{SELECTION_RULES}

Ответь только JSON-массивом из двух целых чисел: [номер категории из списка 1, номер аудитории из списка 2].
Если для списка ничего не подходит, поставь на его место -1. Пример: [2, -1]"#,
        categories = numbered(main_categories),
        audiences = numbered(target_audiences),
    )
}


pub fn build_rerank_prompt(candidates: &[RankedCandidate]) -> String {
    let list = candidates
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{i}. {}", c.answer_text))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"Ты помогаешь оператору поддержки банка выбрать шаблонные ответы на сообщение клиента.

Варианты ответов (номер. текст):
{list}

Выбери ВСЕ варианты, которые хотя бы частично отвечают на сообщение клиента, а не один лучший.
Расположи их от самого полезного к наименее полезному.
Номера должны быть в диапазоне от 0 до {last}.
Ответь только JSON-массивом номеров, например [0, 2]. Никакого другого текста."#,
        last = candidates.len().saturating_sub(1),
    )
}
